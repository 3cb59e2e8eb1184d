use crate::core::attributes::{AttributeRef, NominalAttribute, NumericAttribute};
use crate::core::instance_header::InstanceHeader;
use crate::core::instances::DenseInstance;
use std::sync::Arc;

fn binary_class() -> AttributeRef {
    Arc::new(NominalAttribute::from_labels(
        "class",
        vec!["0".to_string(), "1".to_string()],
    ))
}

/// `n` numeric attributes followed by a binary class.
pub fn header_numeric(n: usize) -> Arc<InstanceHeader> {
    let mut attributes: Vec<AttributeRef> = (0..n)
        .map(|i| Arc::new(NumericAttribute::new(format!("x{i}"))) as AttributeRef)
        .collect();
    attributes.push(binary_class());
    Arc::new(InstanceHeader::new("numeric".to_string(), attributes, n))
}

/// One nominal attribute per entry of `cardinalities`, then a binary class.
pub fn header_nominal(cardinalities: &[usize]) -> Arc<InstanceHeader> {
    let mut attributes: Vec<AttributeRef> = cardinalities
        .iter()
        .enumerate()
        .map(|(i, &c)| {
            let labels = (0..c).map(|v| format!("v{v}")).collect();
            Arc::new(NominalAttribute::from_labels(format!("a{i}"), labels)) as AttributeRef
        })
        .collect();
    attributes.push(binary_class());
    Arc::new(InstanceHeader::new(
        "nominal".to_string(),
        attributes,
        cardinalities.len(),
    ))
}

/// Nominal attributes of the given cardinalities, then `numeric` numeric
/// attributes and a binary class.
pub fn header_mixed(cardinalities: &[usize], numeric: usize) -> Arc<InstanceHeader> {
    let mut attributes: Vec<AttributeRef> = cardinalities
        .iter()
        .enumerate()
        .map(|(i, &c)| {
            let labels = (0..c).map(|v| format!("v{v}")).collect();
            Arc::new(NominalAttribute::from_labels(format!("a{i}"), labels)) as AttributeRef
        })
        .collect();
    let offset = attributes.len();
    attributes.extend(
        (0..numeric)
            .map(|i| Arc::new(NumericAttribute::new(format!("x{}", offset + i))) as AttributeRef),
    );
    let class_index = attributes.len();
    attributes.push(binary_class());
    Arc::new(InstanceHeader::new("mixed".to_string(), attributes, class_index))
}

pub fn numeric_instance(header: &Arc<InstanceHeader>, values: &[f64], class: usize) -> DenseInstance {
    let mut raw = values.to_vec();
    raw.push(class as f64);
    DenseInstance::new(Arc::clone(header), raw, 1.0)
}

pub fn nominal_instance(
    header: &Arc<InstanceHeader>,
    values: &[usize],
    class: usize,
) -> DenseInstance {
    let mut raw: Vec<f64> = values.iter().map(|&v| v as f64).collect();
    raw.push(class as f64);
    DenseInstance::new(Arc::clone(header), raw, 1.0)
}
