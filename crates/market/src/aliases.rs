//! Built-in names of frequently requested instruments.
//!
//! Checked before any remote lookup.

/// (name, Yahoo symbol)
pub const COMMON_TICKERS: &[(&str, &str)] = &[
    // Korean indices
    ("KOSPI", "^KS11"),
    ("KOSDAQ", "^KQ11"),
    ("코스피", "^KS11"),
    ("코스닥", "^KQ11"),
    ("코스피지수", "^KS11"),
    ("코스닥지수", "^KQ11"),
    // KOSPI
    ("삼성전자", "005930.KS"),
    ("삼성전자우", "005935.KS"),
    ("SK하이닉스", "000660.KS"),
    ("LG에너지솔루션", "373220.KS"),
    ("삼성바이오로직스", "207940.KS"),
    ("삼성바이오", "207940.KS"),
    ("현대차", "005380.KS"),
    ("현대자동차", "005380.KS"),
    ("기아", "000270.KS"),
    ("POSCO홀딩스", "005490.KS"),
    ("POSCO", "005490.KS"),
    ("포스코", "005490.KS"),
    ("네이버", "035420.KS"),
    ("NAVER", "035420.KS"),
    ("카카오", "035720.KS"),
    ("LG화학", "051910.KS"),
    ("삼성SDI", "006400.KS"),
    ("현대모비스", "012330.KS"),
    ("셀트리온", "068270.KS"),
    ("SK이노베이션", "096770.KS"),
    ("KB금융", "105560.KS"),
    ("신한지주", "055550.KS"),
    ("하나금융지주", "086790.KS"),
    ("우리금융지주", "316140.KS"),
    ("LG전자", "066570.KS"),
    ("삼성물산", "028260.KS"),
    ("삼성생명", "032830.KS"),
    ("KT&G", "033780.KS"),
    ("SK", "034730.KS"),
    ("기업은행", "024110.KS"),
    ("HMM", "011200.KS"),
    ("포스코퓨처엠", "003670.KS"),
    ("SK텔레콤", "017670.KS"),
    ("KT", "030200.KS"),
    ("LG", "003550.KS"),
    ("한국전력", "015760.KS"),
    ("한전", "015760.KS"),
    // KOSDAQ
    ("셀트리온헬스케어", "091990.KQ"),
    ("에코프로비엠", "247540.KQ"),
    ("에코프로", "086520.KQ"),
    ("알테오젠", "196170.KQ"),
    ("엘앤에프", "066970.KQ"),
    ("HLB", "028300.KQ"),
    ("카카오게임즈", "293490.KQ"),
    // US, Korean names
    ("애플", "AAPL"),
    ("마이크로소프트", "MSFT"),
    ("엔비디아", "NVDA"),
    ("테슬라", "TSLA"),
    ("아마존", "AMZN"),
    ("구글", "GOOGL"),
    ("메타", "META"),
    ("넷플릭스", "NFLX"),
    ("인텔", "INTC"),
    ("나이키", "NKE"),
    ("디즈니", "DIS"),
];

/// How a query matched the table
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AliasMatch {
    Exact(&'static str),
    /// Matched key, when the query and a key contain one another
    Partial(&'static str),
}

impl AliasMatch {
    pub fn key(self) -> &'static str {
        match self {
            AliasMatch::Exact(k) | AliasMatch::Partial(k) => k,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AliasTable {
    entries: Vec<(&'static str, &'static str)>,
}

impl Default for AliasTable {
    fn default() -> Self {
        Self::new(COMMON_TICKERS)
    }
}

impl AliasTable {
    pub fn new(entries: &[(&'static str, &'static str)]) -> Self {
        Self {
            entries: entries.to_vec(),
        }
    }

    /// Exact key first. Otherwise the shortest key that contains the query
    /// or is contained in it, earliest entry on ties.
    pub fn lookup(&self, query: &str) -> Option<(AliasMatch, &'static str)> {
        if let Some(&(k, s)) = self.entries.iter().find(|(k, _)| *k == query) {
            return Some((AliasMatch::Exact(k), s));
        }

        if query.is_empty() {
            return None;
        }

        self.entries
            .iter()
            .filter(|(k, _)| k.contains(query) || query.contains(k))
            .min_by_key(|(k, _)| k.chars().count())
            .map(|&(k, s)| (AliasMatch::Partial(k), s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_wins() {
        let t = AliasTable::default();
        assert_eq!(
            t.lookup("삼성전자"),
            Some((AliasMatch::Exact("삼성전자"), "005930.KS"))
        );
    }

    #[test]
    fn partial_prefers_shortest_key() {
        let t = AliasTable::default();
        // key contained in the query
        assert_eq!(
            t.lookup("우리금융지주회사"),
            Some((AliasMatch::Partial("우리금융지주"), "316140.KS"))
        );
        // query contained in a key
        assert_eq!(
            t.lookup("우리금융"),
            Some((AliasMatch::Partial("우리금융지주"), "316140.KS"))
        );
    }

    #[test]
    fn ties_go_to_the_earlier_entry() {
        let t = AliasTable::new(&[("ab", "1"), ("ba", "2")]);
        assert_eq!(t.lookup("aba").map(|(_, s)| s), Some("1"));
    }

    #[test]
    fn unknown_query() {
        let t = AliasTable::default();
        assert_eq!(t.lookup("zzzz"), None);
        assert_eq!(t.lookup(""), None);
    }
}
