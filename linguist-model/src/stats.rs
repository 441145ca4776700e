//! Word, character and message statistics of translation files.

use serde::Serialize;

use crate::text::TextCounts;

/// Snapshot of a file's (or a set of files') translation progress
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatisticalData {
    /// Source texts of all non-obsolete messages, plural source texts included
    pub source: TextCounts,
    /// Translations of finished messages
    pub finished: TextCounts,
    /// Translations of unfinished messages
    pub unfinished: TextCounts,
    pub translated_msg_no_danger: usize,
    pub translated_msg_danger: usize,
    pub unfinished_msg_no_danger: usize,
    pub unfinished_msg_danger: usize,
    pub obsolete_msg: usize,
}

impl StatisticalData {
    pub fn translated_messages(&self) -> usize {
        self.translated_msg_no_danger + self.translated_msg_danger
    }

    pub fn unfinished_messages(&self) -> usize {
        self.unfinished_msg_no_danger + self.unfinished_msg_danger
    }

    /// Finished messages as a percentage of all non-obsolete ones.
    /// A file without such messages counts as complete.
    pub fn percent_finished(&self) -> usize {
        let total = self.translated_messages() + self.unfinished_messages();
        if total == 0 {
            100
        } else {
            self.translated_messages() * 100 / total
        }
    }
}

impl std::ops::AddAssign for StatisticalData {
    fn add_assign(&mut self, other: Self) {
        self.source += other.source;
        self.finished += other.finished;
        self.unfinished += other.unfinished;
        self.translated_msg_no_danger += other.translated_msg_no_danger;
        self.translated_msg_danger += other.translated_msg_danger;
        self.unfinished_msg_no_danger += other.unfinished_msg_no_danger;
        self.unfinished_msg_danger += other.unfinished_msg_danger;
        self.obsolete_msg += other.obsolete_msg;
    }
}

impl std::iter::Sum for StatisticalData {
    fn sum<I: Iterator<Item = StatisticalData>>(iter: I) -> Self {
        iter.fold(StatisticalData::default(), |mut acc, stats| {
            acc += stats;
            acc
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_finished() {
        let stats = StatisticalData {
            translated_msg_no_danger: 2,
            translated_msg_danger: 1,
            unfinished_msg_no_danger: 1,
            ..Default::default()
        };
        assert_eq!(stats.translated_messages(), 3);
        assert_eq!(stats.percent_finished(), 75);
        assert_eq!(StatisticalData::default().percent_finished(), 100);
    }

    #[test]
    fn test_sum_and_serialize() {
        let one = StatisticalData {
            source: TextCounts::of("ab cd"),
            obsolete_msg: 1,
            ..Default::default()
        };
        let total: StatisticalData = vec![one, one].into_iter().sum();
        assert_eq!(total.source.words, 4);
        assert_eq!(total.obsolete_msg, 2);

        let json = serde_json::to_value(total).unwrap();
        assert_eq!(json["source"]["chars_with_space"], 10);
        assert_eq!(json["obsolete_msg"], 2);
    }
}
