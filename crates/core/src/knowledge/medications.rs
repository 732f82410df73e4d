//! The medication catalog.
//!
//! Conditions link to medications by id. A medication's rate is either fixed or scales with the
//! patient's body weight; as-needed medications carry their rate as a maximum dose.

use serde::Serialize;
use std::fmt;

/// Catalog identifier of a medication. `MedicationId(0)` is the "untreated" link.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct MedicationId(pub u16);

impl fmt::Display for MedicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum RatePeriod {
    Day,
    Week,
    Month,
}

impl RatePeriod {
    /// UCUM code of the period.
    pub fn ucum(self) -> &'static str {
        match self {
            RatePeriod::Day => "d",
            RatePeriod::Week => "wk",
            RatePeriod::Month => "mo",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RatePeriod::Day => "day",
            RatePeriod::Week => "week",
            RatePeriod::Month => "month",
        }
    }
}

/// Dose rate as listed in the catalog.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DoseRate {
    Fixed {
        amount: f64,
        unit: &'static str,
        per: RatePeriod,
    },
    PerKilogram {
        amount_per_kg: f64,
        unit: &'static str,
        per: RatePeriod,
    },
}

impl DoseRate {
    pub const fn fixed(amount: f64, unit: &'static str, per: RatePeriod) -> Self {
        DoseRate::Fixed { amount, unit, per }
    }

    pub const fn per_kilogram(amount_per_kg: f64, unit: &'static str, per: RatePeriod) -> Self {
        DoseRate::PerKilogram {
            amount_per_kg,
            unit,
            per,
        }
    }

    /// Resolve the rate for a patient of the given weight. Weight-based amounts are rounded to
    /// whole units.
    pub fn resolve(&self, weight_kg: f64) -> ResolvedRate {
        match *self {
            DoseRate::Fixed { amount, unit, per } => ResolvedRate { amount, unit, per },
            DoseRate::PerKilogram {
                amount_per_kg,
                unit,
                per,
            } => ResolvedRate {
                amount: (amount_per_kg * weight_kg).round(),
                unit,
                per,
            },
        }
    }
}

/// A dose rate for one patient.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ResolvedRate {
    pub amount: f64,
    pub unit: &'static str,
    pub per: RatePeriod,
}

impl fmt::Display for ResolvedRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} / {}", self.amount, self.unit, self.per.label())
    }
}

/// One row of the medication catalog.
#[derive(Clone, Debug, PartialEq)]
pub struct MedicationCatalogEntry {
    pub id: MedicationId,
    pub rxnorm: &'static str,
    pub brand_name: Option<&'static str>,
    pub generic_name: Option<&'static str>,
    pub as_needed: bool,
    pub rate: DoseRate,
}

pub fn medication(
    id: u16,
    rxnorm: &'static str,
    brand_name: Option<&'static str>,
    generic_name: Option<&'static str>,
    rate: DoseRate,
) -> MedicationCatalogEntry {
    MedicationCatalogEntry {
        id: MedicationId(id),
        rxnorm,
        brand_name,
        generic_name,
        as_needed: false,
        rate,
    }
}

impl MedicationCatalogEntry {
    pub fn as_needed(mut self) -> Self {
        self.as_needed = true;
        self
    }

    /// Display text: `Brand (Trade Name: generic)` for branded products, otherwise the generic
    /// name.
    pub fn display(&self) -> String {
        match (self.brand_name, self.generic_name) {
            (Some(brand), Some(generic)) => format!("{brand} (Trade Name: {generic})"),
            (Some(brand), None) => brand.to_string(),
            (None, Some(generic)) => generic.to_string(),
            (None, None) => format!("RxNorm {}", self.rxnorm),
        }
    }
}

/// The standard catalog of 46 medications.
pub fn standard_medications() -> Vec<MedicationCatalogEntry> {
    vec![
        medication(
            1,
            "997224",
            Some("Aricept"),
            Some("Donepezil Hydrochloride 10mg Oral Tablet"),
            DoseRate::fixed(10.0, "mg", RatePeriod::Day),
        ),
        medication(
            2,
            "141962",
            None,
            Some("Azithromycin 250mg Oral Capsule"),
            DoseRate::fixed(500.0, "mg", RatePeriod::Day),
        ),
        medication(
            3,
            "104376",
            Some("Zestril"),
            Some("Lisinopril 5mg Oral Tablet"),
            DoseRate::fixed(5.0, "mg", RatePeriod::Day),
        ),
        medication(
            4,
            "860998",
            Some("Fortamet"),
            Some("Metformin Hydrochloride 1000mg Extended Release Oral Tablet"),
            DoseRate::fixed(1000.0, "mg", RatePeriod::Day),
        ),
        medication(
            5,
            "1186297",
            Some("XALATAN Ophthalmic Solution"),
            None,
            DoseRate::fixed(1.0, "drop", RatePeriod::Day),
        ),
        medication(
            6,
            "369070",
            Some("Tylenol"),
            Some("Acetaminophen 650mg Tablet"),
            DoseRate::fixed(3900.0, "mg", RatePeriod::Day),
        )
        .as_needed(),
        medication(
            7,
            "261315",
            Some("TamilFlu"),
            Some("Oseltamivir 75mg Oral Tablet"),
            DoseRate::fixed(150.0, "mg", RatePeriod::Day),
        ),
        medication(
            8,
            "104377",
            Some("Zestril"),
            Some("Lisinopril 10mg Oral Tablet"),
            DoseRate::fixed(10.0, "mg", RatePeriod::Day),
        ),
        medication(
            9,
            "904421",
            Some("Fosamax"),
            Some("Alendronate 10mg Oral Tablet"),
            DoseRate::fixed(10.0, "mg", RatePeriod::Day),
        ),
        medication(
            10,
            "644300",
            Some("Lucentis"),
            Some("Ranibizumab Injectable Solution"),
            DoseRate::fixed(0.5, "mg", RatePeriod::Month),
        ),
        medication(
            11,
            "617310",
            None,
            Some("Atorvastatin 20mg Oral Tablet"),
            DoseRate::fixed(20.0, "mg", RatePeriod::Day),
        ),
        medication(
            12,
            "197517",
            None,
            Some("Clarithromycin 500mg Oral Tablet"),
            DoseRate::fixed(500.0, "mg", RatePeriod::Day),
        ),
        medication(
            13,
            "966180",
            Some("Levothroid"),
            Some("Levothyroxine Sodium 0.1mg Oral Tablet"),
            DoseRate::fixed(0.1, "mg", RatePeriod::Day),
        ),
        medication(
            14,
            "849612",
            Some("Bifera"),
            Some("FE HEME Polypeptide 6mg/Polysaccharide Iron Complex 22 MG Oral Tablet"),
            DoseRate::fixed(6.0, "mg", RatePeriod::Day),
        ),
        medication(
            15,
            "198145",
            None,
            Some("Prednisone 10mg Oral Tablet"),
            DoseRate::fixed(10.0, "mg", RatePeriod::Day),
        ),
        medication(
            16,
            "902622",
            Some("Dexilant"),
            Some("Dexlansoprazole 30mg"),
            DoseRate::fixed(30.0, "mg", RatePeriod::Day),
        ),
        medication(
            17,
            "968177",
            Some("Asclera"),
            Some("Polidocanol 5mg/mL"),
            DoseRate::fixed(10.0, "mL", RatePeriod::Week),
        ),
        medication(
            18,
            "203948",
            Some("Amoxil"),
            Some("Amoxicillin 250mg Oral Capsule"),
            DoseRate::fixed(1000.0, "mg", RatePeriod::Day),
        ),
        medication(
            19,
            "197540",
            None,
            Some("Colchicine 0.5mg Oral Tablet"),
            DoseRate::fixed(0.5, "mg", RatePeriod::Day),
        ),
        medication(
            20,
            "1247761",
            Some("Colace"),
            Some("Docusate Sodium 50mg Oral Capsule"),
            DoseRate::fixed(300.0, "mg", RatePeriod::Day),
        )
        .as_needed(),
        medication(
            21,
            "978013",
            Some("Imodium"),
            Some("Loperamide Hydrochloride 2mg Oral Capsule"),
            DoseRate::fixed(16.0, "mg", RatePeriod::Day),
        )
        .as_needed(),
        medication(
            22,
            "197832",
            None,
            Some("Isoniazid 300mg Oral Tablet"),
            DoseRate::fixed(300.0, "mg", RatePeriod::Day),
        ),
        medication(
            23,
            "316812",
            None,
            Some("Thiamine 50mg"),
            DoseRate::fixed(50.0, "mg", RatePeriod::Day),
        ),
        medication(
            24,
            "562918",
            Some("Sumycin"),
            Some("Tetracycline 500mg"),
            DoseRate::fixed(500.0, "mg", RatePeriod::Day),
        ),
        medication(
            25,
            "317364",
            None,
            Some("Erythromycin 250mg"),
            DoseRate::fixed(250.0, "mg", RatePeriod::Day),
        ),
        medication(
            26,
            "884319",
            Some("Zosyn"),
            Some("Piperacillin Injectable Solution"),
            DoseRate::fixed(15.0, "g", RatePeriod::Day),
        ),
        medication(
            27,
            "858123",
            Some("Firmagon"),
            Some("Degarelix Injectable Solution"),
            DoseRate::fixed(80.0, "g", RatePeriod::Month),
        ),
        medication(
            28,
            "371664",
            None,
            Some("Cyclophosphamide Oral Tablet"),
            DoseRate::fixed(300.0, "mg", RatePeriod::Day),
        ),
        medication(
            29,
            "349472",
            None,
            Some("Gefitinib 250mg Oral Tablet"),
            DoseRate::fixed(250.0, "mg", RatePeriod::Day),
        ),
        medication(
            30,
            "544557",
            Some("Avastin"),
            Some("Bevacizumab Injectable Solution"),
            DoseRate::per_kilogram(10.0, "mg", RatePeriod::Week),
        ),
        medication(
            31,
            "1094839",
            Some("Yervoy"),
            Some("Ipilimumab Injectable Solution"),
            DoseRate::per_kilogram(3.0, "mg", RatePeriod::Month),
        ),
        medication(
            32,
            "615978",
            Some("Nexavar"),
            Some("Sorafenib Oral Tablet"),
            DoseRate::fixed(400.0, "mg", RatePeriod::Day),
        )
        .as_needed(),
        medication(
            33,
            "858748",
            Some("Actigall"),
            Some("Ursodiol Oral Product"),
            DoseRate::per_kilogram(10.0, "mg", RatePeriod::Day),
        ),
        medication(
            34,
            "352219",
            Some("Vfend"),
            Some("Voriconazole 200mg Oral Tablet"),
            DoseRate::fixed(200.0, "mg", RatePeriod::Day),
        ),
        medication(
            35,
            "630974",
            None,
            Some("Sodium Bicarbonate 500mg"),
            DoseRate::fixed(500.0, "mg", RatePeriod::Day),
        ),
        medication(
            36,
            "824190",
            Some("Augmentin"),
            Some("Amoxicillin (500mg) & Clavulanate (125mg)"),
            DoseRate::fixed(500.0, "mg", RatePeriod::Day),
        ),
        medication(
            37,
            "205483",
            Some("Dritho-Scalp"),
            Some("Anthralin"),
            DoseRate::fixed(10.0, "mL", RatePeriod::Day),
        )
        .as_needed(),
        medication(
            38,
            "363298",
            Some("Fludara"),
            Some("Fludarabine Injectable Solution"),
            DoseRate::fixed(25.0, "mg", RatePeriod::Week),
        ),
        medication(
            39,
            "854878",
            Some("Ambien"),
            Some("Zolpidem Tartrate Oral Tablet"),
            DoseRate::fixed(5.0, "mg", RatePeriod::Day),
        )
        .as_needed(),
        medication(
            40,
            "213321",
            Some("Maxalt"),
            Some("Rizatriptan Benzoate Oral Tablet"),
            DoseRate::fixed(5.0, "mg", RatePeriod::Day),
        )
        .as_needed(),
        medication(
            41,
            "866307",
            Some("Tegretol"),
            Some("Carbamazepine 400mg Oral Tablet"),
            DoseRate::fixed(800.0, "mg", RatePeriod::Day),
        ),
        medication(
            42,
            "834137",
            Some("PeriodGard"),
            Some("Chlorhexidine Gluconate Mouthwash"),
            DoseRate::fixed(50.0, "mg", RatePeriod::Day),
        ),
        medication(
            43,
            "584503",
            Some("AuroGuard"),
            Some("Antipyrine/Benzocaine Otic Solution"),
            DoseRate::fixed(10.0, "drops", RatePeriod::Day),
        )
        .as_needed(),
        medication(
            44,
            "208416",
            Some("Bactrim"),
            Some("Sulfamethoxazole/Trimethoprim Oral Tablet"),
            DoseRate::fixed(1000.0, "mg", RatePeriod::Day),
        ),
        medication(
            45,
            "1052982",
            Some("Bayer Aspirin"),
            Some("Aspirin 500mg Oral Powder"),
            DoseRate::fixed(4000.0, "mg", RatePeriod::Day),
        )
        .as_needed(),
        medication(
            46,
            "352307",
            Some("Abilify"),
            Some("Aripiprazole 10mg Oral Tablet"),
            DoseRate::fixed(10.0, "mg", RatePeriod::Day),
        ),
    ]
}
