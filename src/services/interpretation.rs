use serde::Serialize;

/// PID-5 domains in display order, internal key first.
pub const PID5_DOMAINS: [(&str, &str); 5] = [
    ("affettivita_negativa", "Affettività Negativa"),
    ("distacco", "Distacco"),
    ("antagonismo", "Antagonismo"),
    ("disinibizione", "Disinibizione"),
    ("psicoticismo", "Psicoticismo"),
];

const PID5_FACETS: [(&str, &str); 25] = [
    ("anedonia", "Anedonia"),
    ("ansia", "Ansia"),
    ("angoscia_separazione", "Angoscia di Separazione"),
    ("depressivita", "Depressività"),
    ("disregolazione_percettiva", "Disregolazione Percettiva"),
    ("distraibilita", "Distraibilità"),
    ("eccentricita", "Eccentricità"),
    ("evitamento_intimita", "Evitamento dell'Intimità"),
    ("grandiosita", "Grandiosità"),
    ("impulsivita", "Impulsività"),
    ("inganno", "Inganno"),
    ("insensibilita", "Insensibilità"),
    ("irresponsabilita", "Irresponsabilità"),
    ("labilita_emotiva", "Labilità Emotiva"),
    ("manipolatorieta", "Manipolatorietà"),
    ("ostilita", "Ostilità"),
    ("perfezionismo_rigido", "Perfezionismo Rigido"),
    ("perseverazione", "Perseverazione"),
    ("affettivita_ridotta", "Affettività Ridotta"),
    ("assunzione_rischi", "Assunzione di Rischi"),
    ("ritiro", "Ritiro"),
    ("ricerca_attenzione", "Ricerca di Attenzione"),
    ("sottomissione", "Sottomissione"),
    ("sospettosita", "Sospettosità"),
    ("convinzioni_esperienze_inusuali", "Convinzioni ed Esperienze Inusuali"),
];

/// The eight S-AS factors, indexed by `id - 1`.
pub const SAS_FACTORS: [(&str, &str); 8] = [
    (
        "Accettazione e appartenenza",
        "Bisogno di essere accolti e di sentirsi parte di un gruppo",
    ),
    (
        "Autonomia e controllo",
        "Importanza attribuita al decidere da sé e al governare gli eventi",
    ),
    (
        "Riconoscimento e valore personale",
        "Ricerca di stima e di conferma del proprio valore",
    ),
    (
        "Sicurezza e protezione",
        "Bisogno di prevedibilità e di evitare pericoli",
    ),
    (
        "Moralità e responsabilità",
        "Peso dato al dovere, alla correttezza e alla colpa",
    ),
    (
        "Competenza e realizzazione",
        "Orientamento al successo e alla padronanza delle proprie capacità",
    ),
    (
        "Intimità e legame affettivo",
        "Desiderio di vicinanza emotiva e di relazioni stabili",
    ),
    (
        "Libertà e indipendenza",
        "Rifiuto dei vincoli e ricerca di spazi personali",
    ),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Severity {
    #[serde(rename = "Molto Basso")]
    VeryLow,
    #[serde(rename = "Basso")]
    Low,
    #[serde(rename = "Medio")]
    Medium,
    #[serde(rename = "Elevato")]
    High,
    #[serde(rename = "Molto Elevato")]
    VeryHigh,
}

impl Severity {
    /// Buckets a PID-5 mean. Each band is closed below and open above.
    pub fn from_mean(mean: f64) -> Self {
        if mean < 0.5 {
            Severity::VeryLow
        } else if mean < 1.0 {
            Severity::Low
        } else if mean < 1.5 {
            Severity::Medium
        } else if mean < 2.0 {
            Severity::High
        } else {
            Severity::VeryHigh
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Severity::VeryLow => "Molto Basso",
            Severity::Low => "Basso",
            Severity::Medium => "Medio",
            Severity::High => "Elevato",
            Severity::VeryHigh => "Molto Elevato",
        }
    }

    pub fn color(&self) -> ColorClass {
        match self {
            Severity::VeryLow => ColorClass::Success,
            Severity::Low => ColorClass::Info,
            Severity::Medium => ColorClass::Warning,
            Severity::High | Severity::VeryHigh => ColorClass::Danger,
        }
    }
}

/// Bootstrap contextual color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorClass {
    Success,
    Info,
    Warning,
    Danger,
}

impl ColorClass {
    pub fn from_mean(mean: f64) -> Self {
        if mean >= 1.5 {
            ColorClass::Danger
        } else if mean >= 1.0 {
            ColorClass::Warning
        } else if mean >= 0.5 {
            ColorClass::Info
        } else {
            ColorClass::Success
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ColorClass::Success => "success",
            ColorClass::Info => "info",
            ColorClass::Warning => "warning",
            ColorClass::Danger => "danger",
        }
    }

    pub fn border_class(&self) -> String {
        format!("border-{}", self.as_str())
    }

    pub fn text_class(&self) -> String {
        format!("text-{}", self.as_str())
    }
}

pub fn domain_label(key: &str) -> Option<&'static str> {
    PID5_DOMAINS
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, label)| *label)
}

pub fn facet_label(key: &str) -> String {
    PID5_FACETS
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, label)| label.to_string())
        .unwrap_or_else(|| humanize_key(key))
}

pub fn sas_factor(id: u8) -> Option<(&'static str, &'static str)> {
    match id {
        1..=8 => Some(SAS_FACTORS[(id - 1) as usize]),
        _ => None,
    }
}

/// `"ricerca_novita"` → `"Ricerca novita"`.
pub fn humanize_key(key: &str) -> String {
    let spaced = key.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Integer share of `value` in `total`, rounded half up. Zero totals give 0.
pub fn percentage(value: f64, total: f64) -> i64 {
    if total <= 0.0 {
        return 0;
    }
    (value / total * 100.0).round() as i64
}

pub fn format_percentage(value: f64, total: f64) -> String {
    format!("{}%", percentage(value, total))
}

pub fn format_mean(mean: f64) -> String {
    format!("{:.2}", mean)
}

/// Stable sort, highest mean first.
pub fn sort_by_mean_desc<T, F>(items: &mut [T], mean: F)
where
    F: Fn(&T) -> f64,
{
    items.sort_by(|a, b| mean(b).total_cmp(&mean(a)));
}

/// The `n` highest entries, ties kept in input order.
pub fn top_n<T, F>(mut items: Vec<T>, n: usize, mean: F) -> Vec<T>
where
    F: Fn(&T) -> f64,
{
    sort_by_mean_desc(&mut items, mean);
    items.truncate(n);
    items
}
