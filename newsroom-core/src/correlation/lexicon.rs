/// Curated reference data the correlation engine matches against.

/// Known ticker symbols, used to suppress false positives from ordinary
/// all-caps acronyms ("CEO", "FBI") that would otherwise match the
/// uppercase-token pattern.
pub const KNOWN_TICKERS: &[&str] = &[
    "AAPL", "MSFT", "GOOG", "GOOGL", "AMZN", "META", "NVDA", "TSLA", "NFLX",
    "AMD", "INTC", "IBM", "ORCL", "CRM", "ADBE", "PYPL", "UBER", "LYFT",
    "BA", "GE", "F", "GM", "XOM", "CVX", "JPM", "GS", "MS", "BAC", "WFC",
    "V", "MA", "DIS", "KO", "PEP", "WMT", "TGT", "COST", "HD", "NKE",
];

/// Country name/alias to canonical id. Matched as a case-insensitive,
/// word-bounded substring search over item text.
pub const COUNTRY_ALIASES: &[(&str, &str)] = &[
    ("united states", "united_states"),
    ("u.s.", "united_states"),
    ("usa", "united_states"),
    ("america", "united_states"),
    ("united kingdom", "united_kingdom"),
    ("uk", "united_kingdom"),
    ("britain", "united_kingdom"),
    ("china", "china"),
    ("prc", "china"),
    ("japan", "japan"),
    ("germany", "germany"),
    ("france", "france"),
    ("india", "india"),
    ("russia", "russia"),
    ("ukraine", "ukraine"),
    ("israel", "israel"),
    ("iran", "iran"),
    ("south korea", "south_korea"),
    ("north korea", "north_korea"),
    ("taiwan", "taiwan"),
    ("canada", "canada"),
    ("mexico", "mexico"),
    ("brazil", "brazil"),
    ("australia", "australia"),
];

/// Mutually contradictory sentiment-marker pairs. A cluster whose member
/// titles contain both halves of a pair is flagged as disagreeing sources.
pub const SENTIMENT_CONTRADICTIONS: &[(&str, &str)] = &[
    ("denies", "confirms"),
    ("rises", "falls"),
    ("wins", "loses"),
    ("surges", "plunges"),
    ("approves", "rejects"),
    ("accepts", "rejects"),
    ("gains", "drops"),
];
