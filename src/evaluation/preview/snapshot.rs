use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// State of a prequential run at one sampling point.
///
/// `extras` holds every other evaluator measurement plus whatever the model
/// reports about itself (node and leaf counts for trees).
#[derive(Clone, Debug, Serialize)]
pub struct Snapshot {
    pub instances_seen: u64,
    pub accuracy: f64,
    pub kappa: f64,
    pub ram_hours: f64,
    pub seconds: f64,
    pub extras: BTreeMap<String, f64>,
}

impl Snapshot {
    fn value(v: f64) -> String {
        if v.is_nan() {
            "NaN".into()
        } else {
            format!("{v:.4}")
        }
    }
}

impl Display for Snapshot {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(
            f,
            "seen={} acc={} kappa={} t={:.3}s",
            self.instances_seen,
            Self::value(self.accuracy),
            Self::value(self.kappa),
            self.seconds
        )?;
        for (name, v) in &self.extras {
            write!(f, " {name}={}", Self::value(*v))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_lists_extras_after_fixed_fields() {
        let snapshot = Snapshot {
            instances_seen: 10,
            accuracy: 0.5,
            kappa: f64::NAN,
            ram_hours: 0.0,
            seconds: 1.25,
            extras: BTreeMap::from([("leaves".to_string(), 3.0)]),
        };
        assert_eq!(
            snapshot.to_string(),
            "seen=10 acc=0.5000 kappa=NaN t=1.250s leaves=3.0000"
        );
    }
}
