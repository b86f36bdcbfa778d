//! Series label parsing
//!
//! INE packs every dimension of a series into its label, e.g.
//!   "01 Andalucía, 8 Contra la libertad e indemnidad sexuales"
//!   "Hombres. Madrid, Comunidad de. Dato base. 25. "
//! Delimiter and field positions differ per table, so each dataset carries its
//! own [`LabelRule`]. A label with fewer parts than the rule's minimum is
//! unparseable and yields `None`; the caller drops that row.

use catalog::Dataset;

/// Dimensions recovered from one label, before region canonicalization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelFields {
    pub region: String,
    /// In the order of [`Dataset::category_columns`]
    pub categories: Vec<String>,
}

/// Split rule and field extraction for one table's labels
pub struct LabelRule {
    pub delimiter: &'static str,
    pub min_parts: usize,
    /// Called with trimmed parts, at least `min_parts` of them
    extract: fn(&[&str]) -> Option<LabelFields>,
}

static CRIMES: LabelRule = LabelRule {
    delimiter: ", ",
    min_parts: 2,
    extract: crime_fields,
};

static DIVORCES: LabelRule = LabelRule {
    delimiter: ". ",
    min_parts: 4,
    extract: divorce_fields,
};

static COUPLES: LabelRule = LabelRule {
    delimiter: ",",
    min_parts: 3,
    extract: couple_fields,
};

static POVERTY: LabelRule = LabelRule {
    delimiter: ".",
    min_parts: 1,
    extract: poverty_fields,
};

static SALARIES: LabelRule = LabelRule {
    delimiter: ".",
    min_parts: 4,
    extract: salary_fields,
};

static EMPLOYMENT: LabelRule = LabelRule {
    delimiter: ".",
    min_parts: 3,
    extract: employment_fields,
};

impl LabelRule {
    pub fn for_dataset(dataset: Dataset) -> &'static LabelRule {
        match dataset {
            Dataset::Crimes => &CRIMES,
            Dataset::Divorces => &DIVORCES,
            Dataset::Couples => &COUPLES,
            Dataset::Poverty => &POVERTY,
            Dataset::Salaries => &SALARIES,
            Dataset::Employment => &EMPLOYMENT,
        }
    }

    pub fn parse(&self, label: &str) -> Option<LabelFields> {
        let label = label.trim_matches('"');
        let parts: Vec<&str> = label.split(self.delimiter).map(str::trim).collect();
        if parts.len() < self.min_parts {
            return None;
        }
        (self.extract)(&parts)
    }
}

/// Parse a label with the rule of `dataset`
pub fn parse_label(dataset: Dataset, label: &str) -> Option<LabelFields> {
    LabelRule::for_dataset(dataset).parse(label)
}

/// Drop a leading "<digits><whitespace>" code, as in "01 Andalucía"
fn strip_numeric_prefix(token: &str) -> &str {
    let rest = token.trim_start_matches(|c: char| c.is_ascii_digit());
    if rest.len() < token.len() && rest.starts_with(char::is_whitespace) {
        rest.trim_start()
    } else {
        token
    }
}

/// "01 Andalucía, <crime>" or "03 Asturias, Principado de, <crime>"
fn crime_fields(parts: &[&str]) -> Option<LabelFields> {
    let name = strip_numeric_prefix(parts[0]);
    let (region, crime_type) = if parts.len() >= 3 {
        // second token qualifies the community: "Principado de" + "Asturias"
        (format!("{} {}", parts[1], name), parts[2..].join(", "))
    } else {
        (name.to_string(), parts[1..].join(", "))
    };
    Some(LabelFields {
        region,
        categories: vec![crime_type],
    })
}

/// "Divorcios. Andalucía. Dato base. Total. "
fn divorce_fields(parts: &[&str]) -> Option<LabelFields> {
    let field = |i: usize| parts[i].trim_end_matches('.').trim().to_string();
    Some(LabelFields {
        region: field(1),
        categories: vec![field(3)],
    })
}

/// "<community>, <union type>, <nationality>", the community possibly in two tokens
fn couple_fields(parts: &[&str]) -> Option<LabelFields> {
    let n = parts.len();
    let (region, union_type, nationality) = match n {
        3 => (parts[0].to_string(), parts[1], parts[2]),
        4 => (format!("{}, {}", parts[0], parts[1]), parts[2], parts[3]),
        _ => (parts[0].to_string(), parts[n - 2], parts[n - 1]),
    };
    Some(LabelFields {
        region,
        categories: vec![union_type.to_string(), nationality.to_string()],
    })
}

/// "Andalucía. Todas las edades. Tasa de riesgo de pobreza ... Base 2013."
/// An empty first part is kept; the region lookup reports it as unmapped
fn poverty_fields(parts: &[&str]) -> Option<LabelFields> {
    Some(LabelFields {
        region: parts[0].to_string(),
        categories: Vec::new(),
    })
}

/// "Mujeres. Andalucía. Dato base. Media. "
fn salary_fields(parts: &[&str]) -> Option<LabelFields> {
    Some(LabelFields {
        region: parts[1].to_string(),
        categories: vec![parts[0].to_string(), normalize_measure(parts[3])],
    })
}

/// "Tasa de empleo de la población. Hombres. Andalucía. Total. "
fn employment_fields(parts: &[&str]) -> Option<LabelFields> {
    Some(LabelFields {
        region: parts[2].to_string(),
        categories: vec![parts[1].to_string()],
    })
}

/// Salary measure code to column value; unknown codes pass through lower-cased
pub fn normalize_measure(code: &str) -> String {
    let clean = code.trim().replace(' ', "_").to_lowercase();
    match clean.as_str() {
        "media" => "media".to_string(),
        "25" => "cuartil_25".to_string(),
        "50" => "mediana".to_string(),
        "75" => "cuartil_75".to_string(),
        _ => clean,
    }
}
