use std::fmt;

/// Selector of the catch-all branch of a nominal binary split.
pub const DEFAULT_NOMINAL_VALUE: f64 = -1.0;

/// Key of one entry in a [`Successors`](super::Successors) table.
///
/// Numeric keys describe one side of a threshold (`value < reference` for the
/// lower side). Nominal keys match the attribute value equal to `selector`,
/// except the default key whose selector is [`DEFAULT_NOMINAL_VALUE`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SuccessorIdentifier {
    is_numeric: bool,
    reference_value: f64,
    selector_value: f64,
    is_lower: bool,
}

impl SuccessorIdentifier {
    pub fn new(is_numeric: bool, reference_value: f64, selector_value: f64, is_lower: bool) -> Self {
        Self {
            is_numeric,
            reference_value,
            selector_value,
            is_lower: is_numeric && is_lower,
        }
    }

    pub fn numeric(threshold: f64, is_lower: bool) -> Self {
        Self::new(true, threshold, threshold, is_lower)
    }

    pub fn nominal(value: f64) -> Self {
        Self::new(false, value, value, false)
    }

    pub fn nominal_default(reference_value: f64) -> Self {
        Self::new(false, reference_value, DEFAULT_NOMINAL_VALUE, false)
    }

    pub fn is_numeric(&self) -> bool {
        self.is_numeric
    }

    pub fn is_lower(&self) -> bool {
        self.is_lower
    }

    pub fn reference_value(&self) -> f64 {
        self.reference_value
    }

    pub fn selector_value(&self) -> f64 {
        self.selector_value
    }

    pub fn is_default(&self) -> bool {
        !self.is_numeric && self.selector_value == DEFAULT_NOMINAL_VALUE
    }

    /// Whether an attribute value is routed through this key. The nominal
    /// default key never matches here; tables fall back to it explicitly.
    pub fn matches(&self, value: f64) -> bool {
        if value.is_nan() {
            return false;
        }
        if self.is_numeric {
            (value < self.reference_value) == self.is_lower
        } else {
            !self.is_default() && value == self.selector_value
        }
    }

    /// The key of the opposite branch of a binary split.
    pub fn other(&self) -> Self {
        if self.is_numeric {
            Self::numeric(self.reference_value, !self.is_lower)
        } else if self.is_default() {
            Self::nominal(self.reference_value)
        } else {
            Self::nominal_default(self.reference_value)
        }
    }

    /// Same key against another numeric threshold.
    pub fn with_threshold(&self, threshold: f64) -> Self {
        Self::numeric(threshold, self.is_lower)
    }
}

impl fmt::Display for SuccessorIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_numeric {
            let op = if self.is_lower { "<" } else { ">=" };
            write!(f, "{op} {}", self.reference_value)
        } else if self.is_default() {
            write!(f, "!= {}", self.reference_value)
        } else {
            write!(f, "== {}", self.selector_value)
        }
    }
}
