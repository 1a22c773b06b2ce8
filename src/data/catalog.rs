//! Option catalog: the distinct, sorted values of each categorical column.

use std::collections::{BTreeMap, BTreeSet};

use crate::domain::{Field, PriceRecord, Selection};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionCatalog {
    options: BTreeMap<Field, Vec<String>>,
}

impl OptionCatalog {
    /// Derive the catalog from dataset rows. Missing values are ignored.
    pub fn from_records(records: &[PriceRecord]) -> Self {
        let mut sets: BTreeMap<Field, BTreeSet<&str>> =
            Field::ALL.into_iter().map(|f| (f, BTreeSet::new())).collect();

        for record in records {
            for field in Field::ALL {
                if let Some(value) = record.get(field) {
                    sets.entry(field).or_default().insert(value);
                }
            }
        }

        let options = sets
            .into_iter()
            .map(|(field, set)| (field, set.into_iter().map(str::to_string).collect()))
            .collect();
        Self { options }
    }

    pub fn options(&self, field: Field) -> &[String] {
        self.options.get(&field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, field: Field, value: &str) -> bool {
        self.options(field)
            .binary_search_by(|v| v.as_str().cmp(value))
            .is_ok()
    }

    /// First option of every field (empty string where a field has none).
    pub fn default_selection(&self) -> Selection {
        let mut selection = Selection::default();
        for field in Field::ALL {
            if let Some(first) = self.options(field).first() {
                selection.set(field, first.clone());
            }
        }
        selection
    }

    /// Fields with no options at all.
    pub fn empty_fields(&self) -> Vec<Field> {
        Field::ALL
            .into_iter()
            .filter(|f| self.options(*f).is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Categories;

    fn record(line: usize, market: Option<&str>, commodity: &str) -> PriceRecord {
        let mut categories = Categories::default();
        categories.set(Field::Market, market.map(str::to_string));
        categories.set(Field::Commodity, Some(commodity.to_string()));
        PriceRecord {
            line,
            categories,
            price: None,
            date: None,
        }
    }

    #[test]
    fn options_are_sorted_distinct_and_skip_missing() {
        let records = vec![
            record(2, Some("Mbeya"), "Rice"),
            record(3, None, "Maize"),
            record(4, Some("Arusha"), "Rice"),
            record(5, Some("Mbeya"), "Beans"),
        ];
        let catalog = OptionCatalog::from_records(&records);

        assert_eq!(catalog.options(Field::Market), &["Arusha", "Mbeya"]);
        assert_eq!(catalog.options(Field::Commodity), &["Beans", "Maize", "Rice"]);
        assert!(catalog.options(Field::Unit).is_empty());

        for field in Field::ALL {
            let opts = catalog.options(field);
            assert!(opts.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn default_selection_takes_first_option() {
        let records = vec![record(2, Some("Mbeya"), "Rice"), record(3, Some("Arusha"), "Maize")];
        let catalog = OptionCatalog::from_records(&records);
        let selection = catalog.default_selection();
        assert_eq!(selection.get(Field::Market), "Arusha");
        assert_eq!(selection.get(Field::Commodity), "Maize");
        assert_eq!(selection.get(Field::Unit), "");
        assert!(catalog.contains(Field::Market, "Mbeya"));
        assert!(!catalog.contains(Field::Market, "Dodoma"));
        assert_eq!(catalog.empty_fields().len(), 6);
    }

    #[test]
    fn catalog_from_loaded_csv_is_sorted_and_distinct() {
        let csv = "date,admin1,admin2,market,category,commodity,unit,priceflag,pricetype,currency,price\n\
                   2023-06-01,Mbeya,Mbeya Urban,Mbeya,cereals and tubers,Rice,KG,actual,Retail,TZS,2500\n\
                   2023-06-01,Dodoma,Dodoma Urban,Dodoma Central,cereals and tubers,Maize,KG,actual,Wholesale,TZS,1000\n\
                   2023-07-01,Dodoma,,Dodoma Central,cereals and tubers, Maize ,KG,actual,Wholesale,TZS,1100\n\
                   2023-07-01,Arusha,Arusha Urban,,pulses and nuts,Beans,,actual,Retail,TZS,3000\n";

        let data = crate::io::read_dataset(csv.as_bytes()).unwrap();
        assert_eq!(data.records.len(), 4);
        let catalog = OptionCatalog::from_records(&data.records);

        assert_eq!(catalog.options(Field::Admin1), &["Arusha", "Dodoma", "Mbeya"]);
        assert_eq!(catalog.options(Field::Admin2), &["Arusha Urban", "Dodoma Urban", "Mbeya Urban"]);
        assert_eq!(catalog.options(Field::Market), &["Dodoma Central", "Mbeya"]);
        assert_eq!(catalog.options(Field::Commodity), &["Beans", "Maize", "Rice"]);
        assert_eq!(catalog.options(Field::Unit), &["KG"]);
        for field in Field::ALL {
            let opts = catalog.options(field);
            assert!(opts.windows(2).all(|w| w[0] < w[1]), "{field:?} not strictly ascending");
            assert!(opts.iter().all(|v| !v.is_empty()));
        }
    }
}
