use serde::{Deserialize, Serialize};

/// Descriptor of the level of theory a result was computed with.
///
/// The main keys are the method family (dft, cc, hf, ...), the concrete
/// method (pbe0, ccsd, ...), the basis set label (def2-svp, cc-pvtz, or
/// empty for semi-empirics) and the spin mode (restricted, unrestricted).
/// The remaining fields describe program provenance and environment.
///
/// Two sentinel values have special meaning in comparisons:
///
/// - `"any"` matches every concrete value in that field (but not an
///   absent one),
/// - `"none"` and the empty string are equivalent ways to say "absent".
///
/// Charge and multiplicity are deliberately not part of the model; they
/// belong to the structure.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Model {
    pub method_family: String,
    pub method: String,
    pub basis_set: String,
    pub spin_mode: String,

    pub program: String,
    pub version: String,

    pub temperature: String,
    pub electronic_temperature: String,

    pub solvation: String,
    pub solvent: String,

    pub embedding: String,
    pub periodic_boundaries: String,
    pub external_field: String,
}

impl Model {
    /// Create a model from the three main keys; every other field takes
    /// its default sentinel (`spin_mode = "any"` in particular).
    pub fn new(
        method_family: impl Into<String>,
        method: impl Into<String>,
        basis_set: impl Into<String>,
    ) -> Self {
        Self {
            method_family: method_family.into(),
            method: method.into(),
            basis_set: basis_set.into(),
            spin_mode: "any".into(),
            program: "any".into(),
            version: "any".into(),
            temperature: "298.15".into(),
            electronic_temperature: "any".into(),
            solvation: "none".into(),
            solvent: "none".into(),
            embedding: "none".into(),
            periodic_boundaries: "none".into(),
            external_field: "none".into(),
        }
    }

    /// Same as [`Model::new`] with an explicit spin mode.
    pub fn with_spin_mode(
        method_family: impl Into<String>,
        method: impl Into<String>,
        basis_set: impl Into<String>,
        spin_mode: impl Into<String>,
    ) -> Self {
        Self {
            spin_mode: spin_mode.into(),
            ..Self::new(method_family, method, basis_set)
        }
    }

    /// Whether an entry reads as "absent": empty or case-insensitive "none".
    pub fn entry_is_none(entry: &str) -> bool {
        entry.is_empty() || entry.eq_ignore_ascii_case("none")
    }

    /// Whether an entry is the case-insensitive wildcard "any".
    pub fn entry_is_any(entry: &str) -> bool {
        entry.eq_ignore_ascii_case("any")
    }

    /// One line per field, for logs and reports.
    pub fn string_representation(&self) -> String {
        let mut out = String::new();
        for (name, value) in self.fields() {
            out.push_str(name);
            out.push_str(" : ");
            out.push_str(value);
            out.push('\n');
        }
        out
    }

    fn fields(&self) -> [(&'static str, &str); 13] {
        [
            ("method_family", &self.method_family),
            ("method", &self.method),
            ("basis_set", &self.basis_set),
            ("spin_mode", &self.spin_mode),
            ("program", &self.program),
            ("version", &self.version),
            ("temperature", &self.temperature),
            ("electronic_temperature", &self.electronic_temperature),
            ("solvation", &self.solvation),
            ("solvent", &self.solvent),
            ("embedding", &self.embedding),
            ("periodic_boundaries", &self.periodic_boundaries),
            ("external_field", &self.external_field),
        ]
    }
}

/// Numeric fields compare as parsed doubles so "298.15" and "298.150" match.
const NUMERIC_FIELDS: [&str; 2] = ["temperature", "electronic_temperature"];

fn field_matches(name: &str, lhs: &str, rhs: &str) -> bool {
    if (Model::entry_is_any(lhs) && !Model::entry_is_none(rhs))
        || (Model::entry_is_any(rhs) && !Model::entry_is_none(lhs))
        || (Model::entry_is_none(lhs) && Model::entry_is_none(rhs))
    {
        return true;
    }
    if lhs.eq_ignore_ascii_case(rhs) {
        return true;
    }
    if NUMERIC_FIELDS.contains(&name) {
        if let (Ok(l), Ok(r)) = (lhs.parse::<f64>(), rhs.parse::<f64>()) {
            return (l - r).abs() < 1e-12;
        }
    }
    false
}

impl PartialEq for Model {
    fn eq(&self, other: &Self) -> bool {
        self.fields()
            .iter()
            .zip(other.fields().iter())
            .all(|((name, lhs), (_, rhs))| field_matches(name, lhs, rhs))
    }
}
