use std::collections::BTreeMap;

use anyhow::{bail, Result};
use tracing::info;

use super::MasterRecord;

/// Share of each polarity class held out for test.
const TEST_SHARE: f64 = 0.8;
/// Test documents every industry group must contribute.
const TEST_DOCS_PER_GROUP: usize = 8;

const INCREASE: &str = "増";
const DECREASE: &str = "減";

#[derive(Debug, Default, PartialEq)]
pub struct DocumentSplit {
    pub dev: Vec<String>,
    pub test: Vec<String>,
}

#[derive(Debug, Default)]
struct ClassCounts {
    increase: usize,
    decrease: usize,
}

/// Stratify documents into dev/test by industry and polarity.
///
/// Within each industry the first `round(n * 0.8)` documents of each polarity,
/// in table order, go to test.
pub fn split_documents(master: &[MasterRecord]) -> Result<DocumentSplit> {
    let mut groups: BTreeMap<&str, Vec<&MasterRecord>> = BTreeMap::new();
    for rec in master {
        groups.entry(rec.industry.as_str()).or_default().push(rec);
    }

    let mut split = DocumentSplit::default();
    let mut dev_counts = ClassCounts::default();
    let mut test_counts = ClassCounts::default();

    for (industry, docs) in groups {
        let count = |p: &str| docs.iter().filter(|d| d.polarity == p).count();
        let inc_quota = quota(count(INCREASE));
        let dec_quota = quota(count(DECREASE));
        if inc_quota + dec_quota != TEST_DOCS_PER_GROUP {
            bail!(
                "industry {:?}: test quotas {} + {} do not sum to {}",
                industry,
                inc_quota,
                dec_quota,
                TEST_DOCS_PER_GROUP
            );
        }

        let mut taken = ClassCounts::default();
        for doc in docs {
            let (seen, limit, dev_slot, test_slot) = match doc.polarity.as_str() {
                INCREASE => (
                    &mut taken.increase,
                    inc_quota,
                    &mut dev_counts.increase,
                    &mut test_counts.increase,
                ),
                DECREASE => (
                    &mut taken.decrease,
                    dec_quota,
                    &mut dev_counts.decrease,
                    &mut test_counts.decrease,
                ),
                other => bail!("{}: unknown polarity {:?}", doc.basename, other),
            };
            if *seen < limit {
                split.test.push(doc.basename.clone());
                *test_slot += 1;
            } else {
                split.dev.push(doc.basename.clone());
                *dev_slot += 1;
            }
            *seen += 1;
        }
    }

    info!(
        dev_increase = dev_counts.increase,
        dev_decrease = dev_counts.decrease,
        test_increase = test_counts.increase,
        test_decrease = test_counts.decrease,
        "documents split"
    );
    Ok(split)
}

/// Test quota for a class of `n` documents, rounding halves to even.
fn quota(n: usize) -> usize {
    (n as f64 * TEST_SHARE).round_ties_even() as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(name: &str, industry: &str, polarity: &str) -> MasterRecord {
        MasterRecord {
            ignore: None,
            stock_code: String::new(),
            url: String::new(),
            basename: name.to_string(),
            industry: industry.to_string(),
            polarity: polarity.to_string(),
        }
    }

    /// `inc` increase and `dec` decrease documents of one industry.
    fn group(industry: &str, inc: usize, dec: usize) -> Vec<MasterRecord> {
        let mut docs = Vec::new();
        for i in 0..inc.max(dec) {
            if i < inc {
                docs.push(doc(&format!("{}-inc{}.pdf", industry, i), industry, INCREASE));
            }
            if i < dec {
                docs.push(doc(&format!("{}-dec{}.pdf", industry, i), industry, DECREASE));
            }
        }
        docs
    }

    #[test]
    fn quotas_round_to_nearest() {
        assert_eq!(quota(0), 0);
        assert_eq!(quota(1), 1);
        assert_eq!(quota(3), 2);
        assert_eq!(quota(5), 4);
        assert_eq!(quota(7), 6);
    }

    #[test]
    fn first_documents_of_each_class_go_to_test() {
        let docs = group("水産", 5, 5);
        let split = split_documents(&docs).unwrap();
        assert_eq!(split.test.len(), 8);
        assert_eq!(split.dev, vec!["水産-inc4.pdf", "水産-dec4.pdf"]);
    }

    #[test]
    fn groups_are_visited_in_key_order() {
        let mut docs = group("鉱業", 10, 0);
        docs.extend(group("建設", 5, 5));
        let split = split_documents(&docs).unwrap();
        assert!(split.test[0].starts_with("建設"));
        assert_eq!(split.dev.len(), 2 + 2);
        assert!(split.dev.contains(&"鉱業-inc8.pdf".to_string()));
        assert!(split.dev.contains(&"鉱業-inc9.pdf".to_string()));
    }

    #[test]
    fn wrong_group_size_is_rejected() {
        let docs = group("水産", 3, 3);
        assert!(split_documents(&docs).is_err());
    }

    #[test]
    fn unknown_polarity_is_rejected() {
        let mut docs = group("水産", 5, 5);
        docs.push(doc("odd.pdf", "水産", "横"));
        assert!(split_documents(&docs).is_err());
    }
}
