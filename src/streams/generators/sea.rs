use crate::core::attributes::{AttributeRef, NominalAttribute, NumericAttribute};
use crate::core::instance_header::InstanceHeader;
use crate::core::instances::{DenseInstance, Instance};
use crate::streams::Stream;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io::{Error, ErrorKind};
use std::sync::Arc;

/// Decision thresholds of the four SEA concepts.
const THRESHOLDS: [f64; 4] = [8.0, 9.0, 7.0, 9.5];

fn threshold_of(function_id: u8) -> Result<f64, Error> {
    match function_id {
        1..=4 => Ok(THRESHOLDS[usize::from(function_id) - 1]),
        other => Err(Error::new(
            ErrorKind::InvalidInput,
            format!("SEA function must be in 1..=4, got {other}"),
        )),
    }
}

/// Abrupt drift: from instance `position` on, the stream labels with
/// `function_id` instead of the initial concept.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConceptSwitch {
    pub position: u64,
    pub function_id: u8,
}

/// SEA concepts: three attributes uniform in `[0, 10)`, class `groupA` when
/// `attrib1 + attrib2 <= threshold`. The third attribute is irrelevant.
#[derive(Debug)]
pub struct SeaGenerator {
    seed: u64,
    rng: StdRng,
    header: Arc<InstanceHeader>,
    initial_threshold: f64,
    threshold: f64,
    switch: Option<(u64, f64)>,
    balance_classes: bool,
    next_class_should_be_zero: bool,
    noise_pct: u32,
    max_instances: Option<u64>,
    produced: u64,
}

impl SeaGenerator {
    pub fn new(
        function_id: u8,
        balance_classes: bool,
        noise_pct: u32,
        max_instances: Option<u64>,
        seed: u64,
    ) -> Result<Self, Error> {
        let threshold = threshold_of(function_id)?;
        if noise_pct > 100 {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                "noise percentage must be in [0, 100]",
            ));
        }

        let attributes: Vec<AttributeRef> = vec![
            Arc::new(NumericAttribute::new("attrib1".into())) as AttributeRef,
            Arc::new(NumericAttribute::new("attrib2".into())) as AttributeRef,
            Arc::new(NumericAttribute::new("attrib3".into())) as AttributeRef,
            Arc::new(NominalAttribute::from_labels(
                "class",
                vec!["groupA".into(), "groupB".into()],
            )) as AttributeRef,
        ];
        let header = Arc::new(InstanceHeader::new("SEA".into(), attributes, 3));

        Ok(Self {
            seed,
            rng: StdRng::seed_from_u64(seed),
            header,
            initial_threshold: threshold,
            threshold,
            switch: None,
            balance_classes,
            next_class_should_be_zero: false,
            noise_pct,
            max_instances,
            produced: 0,
        })
    }

    pub fn with_concept_switch(mut self, switch: ConceptSwitch) -> Result<Self, Error> {
        self.switch = Some((switch.position, threshold_of(switch.function_id)?));
        Ok(self)
    }

    fn label(&self, a1: f64, a2: f64) -> usize {
        if a1 + a2 <= self.threshold { 0 } else { 1 }
    }
}

impl Stream for SeaGenerator {
    fn header(&self) -> &InstanceHeader {
        &self.header
    }

    fn has_more_instances(&self) -> bool {
        self.max_instances.is_none_or(|max| self.produced < max)
    }

    fn next_instance(&mut self) -> Option<Box<dyn Instance>> {
        if !self.has_more_instances() {
            return None;
        }
        if let Some((position, threshold)) = self.switch {
            if self.produced == position {
                self.threshold = threshold;
            }
        }

        let (a1, a2, a3, class) = loop {
            let a1 = self.rng.random_range(0.0..10.0);
            let a2 = self.rng.random_range(0.0..10.0);
            let a3 = self.rng.random_range(0.0..10.0);
            let class = self.label(a1, a2);
            if !self.balance_classes || (class == 0) == self.next_class_should_be_zero {
                self.next_class_should_be_zero = !self.next_class_should_be_zero;
                break (a1, a2, a3, class);
            }
        };

        let roll: u32 = self.rng.random_range(1..=100);
        let class = if roll <= self.noise_pct { 1 - class } else { class };

        self.produced += 1;
        Some(Box::new(DenseInstance::new(
            Arc::clone(&self.header),
            vec![a1, a2, a3, class as f64],
            1.0,
        )))
    }

    fn restart(&mut self) -> Result<(), Error> {
        self.rng = StdRng::seed_from_u64(self.seed);
        self.threshold = self.initial_threshold;
        self.next_class_should_be_zero = false;
        self.produced = 0;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draw(generator: &mut SeaGenerator, n: usize) -> Vec<Vec<f64>> {
        (0..n)
            .map(|_| {
                let inst = generator.next_instance().unwrap();
                (0..inst.number_of_attributes())
                    .map(|i| inst.value_at_index(i).unwrap())
                    .collect()
            })
            .collect()
    }

    #[test]
    fn test_rejects_bad_arguments() {
        assert_eq!(
            SeaGenerator::new(5, false, 0, None, 1).unwrap_err().kind(),
            ErrorKind::InvalidInput
        );
        assert!(SeaGenerator::new(1, false, 101, None, 1).is_err());
        let switch = ConceptSwitch {
            position: 10,
            function_id: 0,
        };
        assert!(
            SeaGenerator::new(1, false, 0, None, 1)
                .unwrap()
                .with_concept_switch(switch)
                .is_err()
        );
    }

    #[test]
    fn test_header_has_three_numeric_attributes_and_binary_class() {
        let generator = SeaGenerator::new(1, false, 0, None, 1).unwrap();
        let header = generator.header();
        assert_eq!(header.number_of_attributes(), 4);
        assert_eq!(header.class_index(), 3);
        assert_eq!(header.number_of_classes(), 2);
        assert!(header.attribute_at_index(0).unwrap().is_numeric());
    }

    #[test]
    fn test_noise_free_labels_follow_the_threshold() {
        let mut generator = SeaGenerator::new(3, false, 0, Some(500), 9).unwrap();
        for row in draw(&mut generator, 500) {
            let expected = if row[0] + row[1] <= 7.0 { 0.0 } else { 1.0 };
            assert_eq!(row[3], expected);
            assert!(row.iter().take(3).all(|v| (0.0..10.0).contains(v)));
        }
        assert!(!generator.has_more_instances());
        assert!(generator.next_instance().is_none());
    }

    #[test]
    fn test_balanced_classes_alternate() {
        let mut generator = SeaGenerator::new(1, true, 0, None, 3).unwrap();
        let classes: Vec<f64> = draw(&mut generator, 20).into_iter().map(|r| r[3]).collect();
        for (i, class) in classes.iter().enumerate() {
            assert_eq!(*class, if i % 2 == 0 { 1.0 } else { 0.0 });
        }
    }

    #[test]
    fn test_concept_switch_changes_the_threshold() {
        let switch = ConceptSwitch {
            position: 100,
            function_id: 3,
        };
        let mut generator = SeaGenerator::new(4, false, 0, None, 5)
            .unwrap()
            .with_concept_switch(switch)
            .unwrap();
        let rows = draw(&mut generator, 300);
        for (i, row) in rows.iter().enumerate() {
            let threshold = if i < 100 { 9.5 } else { 7.0 };
            let expected = if row[0] + row[1] <= threshold { 0.0 } else { 1.0 };
            assert_eq!(row[3], expected);
        }
    }

    #[test]
    fn test_restart_replays_the_stream() {
        let switch = ConceptSwitch {
            position: 5,
            function_id: 2,
        };
        let mut generator = SeaGenerator::new(1, true, 10, None, 11)
            .unwrap()
            .with_concept_switch(switch)
            .unwrap();
        let first = draw(&mut generator, 50);
        generator.restart().unwrap();
        assert_eq!(draw(&mut generator, 50), first);
    }
}
