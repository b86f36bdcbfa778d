//! The INE tables this workspace extracts, and the literal rules that decide
//! which published series of each table are kept.

use clap::ValueEnum;
use std::fmt;

/// Marker INE puts in the label of every nationwide aggregate series
const NATIONAL_TOTAL: &str = "Total Nacional";

// =============================================================================
// Series filters (literal phrases as published by INE)
// =============================================================================

/// Crime categories related to family and sexual offences (table 62327)
const CRIME_CATEGORIES: &[&str] = &[
    "8 Contra la libertad e indemnidad sexuales",
    "12 Contra las relaciones familiares",
    "12.3 Contra los derechos y deberes familiares",
    "12.3.1 Quebrantamiento de los deberes de custodia",
    "12.3.2 Sustracción de menores",
    "12.3.3 Abandono de familia",
    "12.99 Otros delitos contra las relaciones familiares",
];

const SALARY_SEX_PREFIXES: &[&str] = &["Mujeres.", "Hombres."];
const SALARY_MEASURES: &[&str] = &["Media", "25", "50", "75"];

const EMPLOYMENT_SEX_PREFIXES: &[&str] = &[
    "Tasa de empleo de la población. Hombres.",
    "Tasa de empleo de la población. Mujeres.",
];
const EMPLOYMENT_EXCLUDED: &[&str] = &[NATIONAL_TOTAL, "Española", "Extranjera:"];

/// Which field of an INE data point carries the year
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YearField {
    /// `NombrePeriodo`, used by the PC-Axis style tables
    PeriodName,
    /// `Anyo`, used by the Tempus3 tables
    Year,
}

/// One INE table and the pipeline built around it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, ValueEnum)]
pub enum Dataset {
    Crimes,
    Divorces,
    Couples,
    Poverty,
    Salaries,
    Employment,
}

impl Dataset {
    /// Every dataset, in the order batch runs process them
    pub const ALL: [Dataset; 6] = [
        Dataset::Crimes,
        Dataset::Divorces,
        Dataset::Couples,
        Dataset::Poverty,
        Dataset::Salaries,
        Dataset::Employment,
    ];

    /// Command-line name
    pub fn name(self) -> &'static str {
        match self {
            Dataset::Crimes => "crimes",
            Dataset::Divorces => "divorces",
            Dataset::Couples => "couples",
            Dataset::Poverty => "poverty",
            Dataset::Salaries => "salaries",
            Dataset::Employment => "employment",
        }
    }

    /// Table title as published by INE
    pub fn title(self) -> &'static str {
        match self {
            Dataset::Crimes => "Delitos según tipo por comunidades y ciudades autónomas",
            Dataset::Divorces => "Divorcios según tipo de divorcio",
            Dataset::Couples => {
                "Número de parejas por comunidades y ciudades autónomas según nacionalidad de la pareja y tipo de unión"
            }
            Dataset::Poverty => {
                "Tasa de riesgo de pobreza o exclusión social (indicador AROPE) por comunidades autónomas"
            }
            Dataset::Salaries => "Medias y percentiles por sexo y CCAA",
            Dataset::Employment => "Tasas de empleo por nacionalidad, sexo y comunidad autónoma",
        }
    }

    /// Table identifier in the `DATOS_TABLA` endpoint
    pub fn table_id(self) -> &'static str {
        match self {
            Dataset::Crimes => "62327",
            Dataset::Divorces => "21475",
            Dataset::Couples => "t20/p274/serie/def/p02/02017.px",
            Dataset::Poverty => "10011",
            Dataset::Salaries => "28191",
            Dataset::Employment => "65310",
        }
    }

    /// Full request URL for this table under `api_base`
    pub fn api_url(self, api_base: &str) -> String {
        format!(
            "{}/{}?tip=A&det=2",
            api_base.trim_end_matches('/'),
            self.table_id()
        )
    }

    /// Common stem of the raw and processed file names
    pub fn file_stem(self) -> &'static str {
        match self {
            Dataset::Crimes => "ine_delitos_familia_sexualidad",
            Dataset::Divorces => "ine_divorcios_por_tipo",
            Dataset::Couples => "ine_parejas_por_nacionalidad_y_tipo_union",
            Dataset::Poverty => "ine_riesgo_pobreza_exclusion_social",
            Dataset::Salaries => "ine_salarios_medias_percentiles",
            Dataset::Employment => "ine_tasas_empleo_por_nacionalidad_sexo_ccaa",
        }
    }

    pub fn raw_file_name(self) -> String {
        format!("{}.csv", self.file_stem())
    }

    pub fn processed_file_name(self) -> String {
        format!("{}_processed.csv", self.file_stem())
    }

    pub fn year_field(self) -> YearField {
        match self {
            Dataset::Crimes | Dataset::Couples => YearField::PeriodName,
            _ => YearField::Year,
        }
    }

    /// Only the employment table is published per quarter
    pub fn is_quarterly(self) -> bool {
        matches!(self, Dataset::Employment)
    }

    /// Category columns of the processed table, between region and metric
    pub fn category_columns(self) -> &'static [&'static str] {
        match self {
            Dataset::Crimes => &["tipo_delito"],
            Dataset::Divorces => &["tipo_divorcio"],
            Dataset::Couples => &["tipo_union", "nacionalidad"],
            Dataset::Poverty => &[],
            Dataset::Salaries => &["sexo", "medida"],
            Dataset::Employment => &["genero"],
        }
    }

    pub fn metric_column(self) -> &'static str {
        match self {
            Dataset::Crimes => "numero_delitos",
            Dataset::Divorces => "numero_divorcios",
            Dataset::Couples => "numero_parejas",
            Dataset::Poverty => "tasa_arope",
            Dataset::Salaries => "value",
            Dataset::Employment => "tasa_promedio_empleo",
        }
    }

    /// Header row of the processed CSV
    pub fn processed_headers(self) -> Vec<&'static str> {
        let mut headers = vec!["year", "comunidad_autonoma"];
        headers.extend_from_slice(self.category_columns());
        headers.push(self.metric_column());
        headers
    }

    /// Decide from the raw label whether a series belongs in the extract
    pub fn keeps_series(self, label: &str) -> bool {
        match self {
            Dataset::Crimes => {
                CRIME_CATEGORIES.iter().any(|c| label.contains(c)) && !label.contains(NATIONAL_TOTAL)
            }
            Dataset::Divorces | Dataset::Couples | Dataset::Poverty => {
                !label.contains(NATIONAL_TOTAL)
            }
            Dataset::Salaries => {
                SALARY_SEX_PREFIXES.iter().any(|p| label.starts_with(p))
                    && SALARY_MEASURES.iter().any(|m| label.contains(m))
                    && !label.contains(NATIONAL_TOTAL)
            }
            Dataset::Employment => {
                EMPLOYMENT_SEX_PREFIXES.iter().any(|p| label.starts_with(p))
                    && !EMPLOYMENT_EXCLUDED.iter().any(|x| label.contains(x))
            }
        }
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // SERIES FILTER TESTS
    // -------------------------------------------------------------------------

    #[test]
    fn test_crimes_keeps_family_and_sexual_offences() {
        assert!(Dataset::Crimes.keeps_series("01 Andalucía, 8 Contra la libertad e indemnidad sexuales"));
        assert!(Dataset::Crimes.keeps_series("13 Madrid, Comunidad de, 12.3.2 Sustracción de menores"));
    }

    #[test]
    fn test_crimes_drops_other_offences_and_national_total() {
        assert!(!Dataset::Crimes.keeps_series("01 Andalucía, 13 Contra el patrimonio y el orden socioeconómico"));
        assert!(!Dataset::Crimes.keeps_series("00 Total Nacional, 8 Contra la libertad e indemnidad sexuales"));
    }

    #[test]
    fn test_divorces_couples_poverty_drop_national_total_only() {
        for dataset in [Dataset::Divorces, Dataset::Couples, Dataset::Poverty] {
            assert!(dataset.keeps_series("Divorcios. Andalucía. Dato base. Total. "));
            assert!(!dataset.keeps_series("Divorcios. Total Nacional. Dato base. Total. "));
        }
    }

    #[test]
    fn test_salaries_requires_sex_prefix_and_measure() {
        assert!(Dataset::Salaries.keeps_series("Mujeres. Andalucía. Dato base. Media. "));
        assert!(Dataset::Salaries.keeps_series("Hombres. Madrid, Comunidad de. Dato base. 25. "));
        assert!(!Dataset::Salaries.keeps_series("Ambos sexos. Andalucía. Dato base. Media. "));
        assert!(!Dataset::Salaries.keeps_series("Mujeres. Andalucía. Dato base. Percentil 10. "));
        assert!(!Dataset::Salaries.keeps_series("Mujeres. Total Nacional. Dato base. Media. "));
    }

    #[test]
    fn test_employment_filters_sex_and_sub_populations() {
        assert!(Dataset::Employment
            .keeps_series("Tasa de empleo de la población. Hombres. Andalucía. Total. "));
        assert!(Dataset::Employment
            .keeps_series("Tasa de empleo de la población. Mujeres. Galicia. Total. "));
        assert!(!Dataset::Employment
            .keeps_series("Tasa de empleo de la población. Ambos sexos. Galicia. Total. "));
        assert!(!Dataset::Employment
            .keeps_series("Tasa de empleo de la población. Hombres. Andalucía. Española. "));
        assert!(!Dataset::Employment
            .keeps_series("Tasa de empleo de la población. Hombres. Andalucía. Extranjera: Total. "));
        assert!(!Dataset::Employment
            .keeps_series("Tasa de empleo de la población. Hombres. Total Nacional. Total. "));
    }

    // -------------------------------------------------------------------------
    // CATALOG TESTS
    // -------------------------------------------------------------------------

    #[test]
    fn test_api_url() {
        let url = Dataset::Divorces.api_url("https://servicios.ine.es/wstempus/js/ES/DATOS_TABLA/");
        assert_eq!(
            url,
            "https://servicios.ine.es/wstempus/js/ES/DATOS_TABLA/21475?tip=A&det=2"
        );
    }

    #[test]
    fn test_file_names() {
        assert_eq!(Dataset::Crimes.raw_file_name(), "ine_delitos_familia_sexualidad.csv");
        assert_eq!(
            Dataset::Employment.processed_file_name(),
            "ine_tasas_empleo_por_nacionalidad_sexo_ccaa_processed.csv"
        );
    }

    #[test]
    fn test_processed_headers() {
        assert_eq!(
            Dataset::Couples.processed_headers(),
            vec!["year", "comunidad_autonoma", "tipo_union", "nacionalidad", "numero_parejas"]
        );
        assert_eq!(
            Dataset::Poverty.processed_headers(),
            vec!["year", "comunidad_autonoma", "tasa_arope"]
        );
    }

    #[test]
    fn test_only_employment_is_quarterly() {
        let quarterly: Vec<Dataset> = Dataset::ALL.into_iter().filter(|d| d.is_quarterly()).collect();
        assert_eq!(quarterly, vec![Dataset::Employment]);
    }

    #[test]
    fn test_cli_names_round_trip() {
        for dataset in Dataset::ALL {
            let parsed = Dataset::from_str(dataset.name(), true).unwrap();
            assert_eq!(parsed, dataset);
        }
    }
}
