//! Typed patient input, the obesity label set, and the clinical read-out
//! (BMI band, risk tier, follow-up recommendations) shown next to a
//! prediction.
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::data_handling::{FieldValue, Record};

macro_rules! dataset_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $text)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Value as spelled in the training dataset.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.trim();
                $name::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(s))
                    .ok_or_else(|| format!("Unknown {} value: {}", stringify!($name), s))
            }
        }
    };
}

dataset_enum!(Gender {
    Female => "Female",
    Male => "Male",
});

dataset_enum!(
    /// `family_history`, `FAVC`, `SMOKE` and `SCC`.
    YesNo {
        Yes => "yes",
        No => "no",
    }
);

dataset_enum!(
    /// `CAEC` (snacking) and `CALC` (alcohol).
    Frequency {
        No => "no",
        Sometimes => "Sometimes",
        Frequently => "Frequently",
        Always => "Always",
    }
);

dataset_enum!(Transport {
    PublicTransportation => "Public_Transportation",
    Walking => "Walking",
    Automobile => "Automobile",
    Motorbike => "Motorbike",
    Bike => "Bike",
});

dataset_enum!(
    /// The seven labels, declared in order of clinical severity.
    ObesityLevel {
        InsufficientWeight => "Insufficient_Weight",
        NormalWeight => "Normal_Weight",
        OverweightLevelI => "Overweight_Level_I",
        OverweightLevelII => "Overweight_Level_II",
        ObesityTypeI => "Obesity_Type_I",
        ObesityTypeII => "Obesity_Type_II",
        ObesityTypeIII => "Obesity_Type_III",
    }
);

impl ObesityLevel {
    /// Position on the severity scale, 0 (insufficient) to 6 (type III).
    pub fn severity(&self) -> usize {
        ObesityLevel::ALL
            .iter()
            .position(|l| l == self)
            .unwrap_or_default()
    }

    pub fn risk(&self) -> RiskLevel {
        match self {
            ObesityLevel::ObesityTypeI | ObesityLevel::ObesityTypeII | ObesityLevel::ObesityTypeIII => {
                RiskLevel::High
            }
            ObesityLevel::OverweightLevelI | ObesityLevel::OverweightLevelII => RiskLevel::Moderate,
            ObesityLevel::InsufficientWeight | ObesityLevel::NormalWeight => RiskLevel::Low,
        }
    }
}

impl PartialOrd for ObesityLevel {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ObesityLevel {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.severity().cmp(&other.severity())
    }
}

/// One patient's attributes with the dataset's column names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientRecord {
    #[serde(rename = "Gender")]
    pub gender: Gender,
    #[serde(rename = "Age")]
    pub age: f64,
    /// Metres.
    #[serde(rename = "Height")]
    pub height: f64,
    /// Kilograms.
    #[serde(rename = "Weight")]
    pub weight: f64,
    pub family_history: YesNo,
    /// Frequent consumption of high-calorie food.
    #[serde(rename = "FAVC")]
    pub favc: YesNo,
    /// Vegetable consumption score.
    #[serde(rename = "FCVC")]
    pub fcvc: f64,
    /// Number of main meals.
    #[serde(rename = "NCP")]
    pub ncp: f64,
    /// Eating between meals.
    #[serde(rename = "CAEC")]
    pub caec: Frequency,
    #[serde(rename = "SMOKE")]
    pub smoke: YesNo,
    /// Daily water intake.
    #[serde(rename = "CH2O")]
    pub ch2o: f64,
    /// Calorie monitoring.
    #[serde(rename = "SCC")]
    pub scc: YesNo,
    /// Physical activity frequency.
    #[serde(rename = "FAF")]
    pub faf: f64,
    /// Time using electronic devices.
    #[serde(rename = "TUE")]
    pub tue: f64,
    /// Alcohol consumption.
    #[serde(rename = "CALC")]
    pub calc: Frequency,
    #[serde(rename = "MTRANS")]
    pub mtrans: Transport,
}

impl PatientRecord {
    pub fn bmi(&self) -> f64 {
        bmi(self.weight, self.height)
    }

    pub fn to_record(&self) -> Record {
        let mut r = Record::new();
        let mut num = |k: &str, v: f64| {
            r.insert(k.to_string(), FieldValue::Number(v));
        };
        num("Age", self.age);
        num("Height", self.height);
        num("Weight", self.weight);
        num("FCVC", self.fcvc);
        num("NCP", self.ncp);
        num("CH2O", self.ch2o);
        num("FAF", self.faf);
        num("TUE", self.tue);

        let mut cat = |k: &str, v: &'static str| {
            r.insert(k.to_string(), FieldValue::from(v));
        };
        cat("Gender", self.gender.as_str());
        cat("family_history", self.family_history.as_str());
        cat("FAVC", self.favc.as_str());
        cat("CAEC", self.caec.as_str());
        cat("SMOKE", self.smoke.as_str());
        cat("SCC", self.scc.as_str());
        cat("CALC", self.calc.as_str());
        cat("MTRANS", self.mtrans.as_str());
        r
    }
}

impl From<&PatientRecord> for Record {
    fn from(p: &PatientRecord) -> Self {
        p.to_record()
    }
}

/// Body-mass index, weight (kg) over height (m) squared.
pub fn bmi(weight: f64, height: f64) -> f64 {
    weight / (height * height)
}

/// Coarse BMI bands used next to the model output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BmiBand {
    Normal,
    Overweight,
    Obesity,
}

impl BmiBand {
    pub fn from_bmi(bmi: f64) -> Self {
        if bmi >= 30.0 {
            BmiBand::Obesity
        } else if bmi >= 25.0 {
            BmiBand::Overweight
        } else {
            BmiBand::Normal
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
}

impl RiskLevel {
    /// Follow-up plan for the tier: referrals, interventions, monitoring.
    pub fn recommendations(&self) -> &'static [&'static str] {
        match self {
            RiskLevel::High => &[
                "Refer to nutritionist, endocrinologist and cardiology",
                "Structured exercise programme with psychological follow-up",
                "Complete metabolic assessment",
                "Fortnightly consultations with laboratory tests",
            ],
            RiskLevel::Moderate => &[
                "Nutritional re-education with a personalised meal plan",
                "Start progressive physical activity, 150 min/week moderate",
                "Monthly consultations with a realistic weight goal",
            ],
            RiskLevel::Low => &[
                "Maintain healthy habits, balanced diet and hydration",
                "Regular physical activity and annual check-up",
            ],
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            RiskLevel::Low => "low",
            RiskLevel::Moderate => "moderate",
            RiskLevel::High => "high",
        };
        f.write_str(s)
    }
}
