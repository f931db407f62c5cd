use rand::Rng;
use serde::Serialize;

/// Condition report in the shape the server accepts
#[derive(Debug, Clone, Serialize)]
pub struct Condition {
    pub is_sitting: bool,
    pub condition: String,
    pub message: String,
    pub timestamp: i64,
}

const MESSAGES: [&str; 4] = ["purring", "hungry", "sleeping", "wants attention"];

/// Per-device virtual clock that advances a few minutes per report
#[derive(Debug, Clone)]
pub struct DeviceClock {
    pub jia_isu_uuid: String,
    pub now: i64,
}

impl DeviceClock {
    pub fn new(jia_isu_uuid: String, now: i64) -> Self {
        Self { jia_isu_uuid, now }
    }

    pub fn next_condition(&mut self, rng: &mut impl Rng) -> Condition {
        self.now += rng.gen_range(60..=600);

        // Mostly healthy, occasionally something goes wrong
        let is_broken = rng.gen_bool(0.02);
        let is_dirty = rng.gen_bool(0.1);
        let is_overweight = rng.gen_bool(0.05);

        Condition {
            is_sitting: rng.gen_bool(0.5),
            condition: format!(
                "is_broken={},is_dirty={},is_overweight={}",
                is_broken, is_dirty, is_overweight
            ),
            message: MESSAGES[rng.gen_range(0..MESSAGES.len())].to_string(),
            timestamp: self.now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conditions_are_well_formed_and_ordered() {
        let mut rng = rand::thread_rng();
        let mut clock = DeviceClock::new("isu-1".to_string(), 1_629_417_600);
        let mut last = clock.now;
        for _ in 0..100 {
            let c = clock.next_condition(&mut rng);
            assert!(c.timestamp > last);
            last = c.timestamp;

            let keys: Vec<&str> = c
                .condition
                .split(',')
                .map(|pair| pair.split('=').next().unwrap())
                .collect();
            assert_eq!(keys, vec!["is_broken", "is_dirty", "is_overweight"]);
            assert!(c
                .condition
                .split(',')
                .all(|pair| pair.ends_with("=true") || pair.ends_with("=false")));
        }
    }
}
