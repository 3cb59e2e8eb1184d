mod instance_conditional_test;
mod nominal_attribute_multiway_test;

pub use instance_conditional_test::InstanceConditionalTest;
pub(crate) use instance_conditional_test::tested_value;
pub use nominal_attribute_binary_test::NominalAttributeBinaryTest;
pub use nominal_attribute_multiway_test::NominalAttributeMultiwayTest;
pub use numeric_attribute_binary_test::NumericAttributeBinaryTest;
