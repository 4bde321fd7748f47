use std::collections::HashMap;

/// Values per spatial id for a single calendar year, kept in first-seen id order.
///
/// A bucket is never shrunk in place: once its year is over it is taken whole
/// with [`YearBucket::take`] and a fresh one replaces it.
#[derive(Debug, Default)]
pub struct YearBucket {
    year: Option<String>,
    index: HashMap<String, usize>,
    series: Vec<(String, Vec<f64>)>,
    value_count: usize,
}

impl YearBucket {
    pub fn new(year: &str) -> Self {
        Self {
            year: Some(year.to_string()),
            ..Self::default()
        }
    }

    pub fn year(&self) -> Option<&str> {
        self.year.as_deref()
    }

    pub fn push(&mut self, id: &str, value: f64) {
        match self.index.get(id) {
            Some(&slot) => self.series[slot].1.push(value),
            None => {
                self.index.insert(id.to_string(), self.series.len());
                self.series.push((id.to_string(), vec![value]));
            }
        }
        self.value_count += 1;
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Number of distinct ids seen this year
    pub fn id_count(&self) -> usize {
        self.series.len()
    }

    /// Number of values held across all ids
    pub fn value_count(&self) -> usize {
        self.value_count
    }

    /// Hand over the accumulated series and leave an empty bucket for `next_year`
    pub fn take(&mut self, next_year: &str) -> (Option<String>, Vec<(String, Vec<f64>)>) {
        let finished = std::mem::replace(self, YearBucket::new(next_year));
        (finished.year, finished.series)
    }

    /// Consume the bucket at end of input
    pub fn into_parts(self) -> (Option<String>, Vec<(String, Vec<f64>)>) {
        (self.year, self.series)
    }
}
