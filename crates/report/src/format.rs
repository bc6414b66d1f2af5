use domain::Price;

/// Price rendering per quote currency
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PriceFormat {
    /// `$1,234.56`
    Usd,
    /// `71,300원`, whole won
    KrwWon,
    /// `2,650.12pt`, Korean indices
    KrwPoints,
    /// `1,234.56 EUR`
    Other(String),
}

impl PriceFormat {
    /// KRW symbols starting with `^` are indices and quoted in points
    pub fn for_symbol(currency: &str, symbol: &str) -> Self {
        match currency {
            "USD" => PriceFormat::Usd,
            "KRW" if symbol.starts_with('^') => PriceFormat::KrwPoints,
            "KRW" => PriceFormat::KrwWon,
            other => PriceFormat::Other(other.to_string()),
        }
    }

    pub fn format(&self, price: Price) -> String {
        match self {
            PriceFormat::Usd => format!("${}", grouped(price.0, 2)),
            PriceFormat::KrwWon => format!("{}원", grouped(price.0, 0)),
            PriceFormat::KrwPoints => format!("{}pt", grouped(price.0, 2)),
            PriceFormat::Other(code) => format!("{} {}", grouped(price.0, 2), code),
        }
    }

    /// Unit label for axis / column titles
    pub fn unit(&self) -> &str {
        match self {
            PriceFormat::Usd => "USD",
            PriceFormat::KrwWon => "KRW",
            PriceFormat::KrwPoints => "Points",
            PriceFormat::Other(code) => code,
        }
    }
}

/// Fixed decimals with `,` every three integer digits
fn grouped(v: f64, decimals: usize) -> String {
    let s = format!("{:.*}", decimals, v.abs());
    let (int, frac) = match s.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (s.as_str(), None),
    };

    let mut out = String::with_capacity(s.len() + int.len() / 3 + 1);
    if v < 0.0 && s.bytes().any(|b| b.is_ascii_digit() && b != b'0') {
        out.push('-');
    }
    for (i, c) in int.chars().enumerate() {
        if i > 0 && (int.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    if let Some(f) = frac {
        out.push('.');
        out.push_str(f);
    }
    out
}
