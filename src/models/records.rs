/// One observation of a long-format stream: `(id, date, value)`
#[derive(Debug, Clone, PartialEq)]
pub struct LongRecord {
    pub id: String,
    /// `YYYYMMDD`
    pub date: String,
    pub value: f64,
    /// 1-based line of the record in its source file
    pub line: u64,
}

impl LongRecord {
    /// Calendar year prefix of the date, if it is four ASCII digits
    pub fn year(&self) -> Option<&str> {
        let year = self.date.get(..4)?;
        year.chars().all(|c| c.is_ascii_digit()).then_some(year)
    }

    pub fn same_key(&self, other: &LongRecord) -> bool {
        self.id == other.id && self.date == other.date
    }

    pub fn key(&self) -> String {
        format!("({}, {})", self.id, self.date)
    }
}
