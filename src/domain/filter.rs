use std::fmt;

use clap::ValueEnum;
use itertools::Itertools;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, ValueEnum)]
pub enum Category {
    Analyst,
    BranchOffice,
    Collections,
    Compliance,
    ComptrollerAccounting,
    ContactCenter,
    Facilities,
    HumanResources,
    InformationTechnology,
    Internship,
    Lending,
    MarketingSocialMedia,
    Mortgage,
    Security,
    Skillbridge,
    Training,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, ValueEnum)]
pub enum Location {
    PensacolaFl,
    ViennaVa,
    WinchesterVa,
    Remote,
}

impl Category {
    pub const ALL: [Category; 16] = [
        Category::Analyst,
        Category::BranchOffice,
        Category::Collections,
        Category::Compliance,
        Category::ComptrollerAccounting,
        Category::ContactCenter,
        Category::Facilities,
        Category::HumanResources,
        Category::InformationTechnology,
        Category::Internship,
        Category::Lending,
        Category::MarketingSocialMedia,
        Category::Mortgage,
        Category::Security,
        Category::Skillbridge,
        Category::Training,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            Category::Analyst => "analyst",
            Category::BranchOffice => "branch-office",
            Category::Collections => "collections",
            Category::Compliance => "compliance",
            Category::ComptrollerAccounting => "comptroller-accounting",
            Category::ContactCenter => "contact-center",
            Category::Facilities => "facilities",
            Category::HumanResources => "human-resources",
            Category::InformationTechnology => "information-technology",
            Category::Internship => "internship",
            Category::Lending => "lending",
            Category::MarketingSocialMedia => "marketing-social-media",
            Category::Mortgage => "mortgage",
            Category::Security => "security",
            Category::Skillbridge => "skillbridge",
            Category::Training => "training",
        }
    }

    /// Portal facet filters for this category.
    fn facets(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            Category::Analyst => &[("cfm4[]", "ANALYS"), ("cfm4[]", "DATA")],
            Category::BranchOffice => &[("cfm3[]", "NFC12")],
            Category::Collections => &[("cfm4[]", "CREDIT")],
            Category::Compliance => &[("cfm4[]", "COMPLI")],
            Category::ComptrollerAccounting => &[("cfm4[]", "NFC02")],
            Category::ContactCenter => &[("cfm3[]", "NFC18"), ("cfm4[]", "CUSTOM")],
            Category::Facilities => &[("cfm4[]", "FACILI")],
            Category::HumanResources => &[("cfm3[]", "NFC04")],
            Category::InformationTechnology => &[("cfm4[]", "INFORM"), ("cfm4[]", "SOFTWA")],
            Category::Internship => &[("cfm4[]", "INTERN")],
            Category::Lending => &[("cfm3[]", "NFC09")],
            Category::MarketingSocialMedia => &[("cfm4[]", "MARKET")],
            Category::Mortgage => &[("cfm4[]", "MORTGE")],
            Category::Security => &[("cfm3[]", "NFC14")],
            Category::Skillbridge => &[("cfm4[]", "CONTRA"), ("cfm5[]", "T")],
            Category::Training => &[("cfm4[]", "EDUCAT")],
        }
    }
}

impl Location {
    pub const ALL: [Location; 4] = [
        Location::PensacolaFl,
        Location::ViennaVa,
        Location::WinchesterVa,
        Location::Remote,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            Location::PensacolaFl => "pensacola-fl",
            Location::ViennaVa => "vienna-va",
            Location::WinchesterVa => "winchester-va",
            Location::Remote => "remote",
        }
    }

    fn facets(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            Location::PensacolaFl => &[("cfm8[]", "NFCU1-PCC"), ("cfm8[]", "NFCU1-PML")],
            Location::ViennaVa => &[("cfm8[]", "NFCU1-HDQ"), ("cfm8[]", "NFCU1-HERN")],
            Location::WinchesterVa => &[("cfm8[]", "NFCU1-WCC")],
            Location::Remote => &[("cfm8[]", "NFCU1-RMT")],
        }
    }
}

/// Query string pairs for one listings search, page number excluded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingQuery {
    params: Vec<(&'static str, &'static str)>,
}

impl ListingQuery {
    pub fn params(&self) -> &[(&'static str, &'static str)] {
        &self.params
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FilterCombination {
    pub location: Location,
    pub category: Category,
}

impl FilterCombination {
    pub fn new(location: Location, category: Category) -> Self {
        FilterCombination { location, category }
    }

    pub fn query(&self) -> ListingQuery {
        let mut params = vec![("ns_category", self.category.slug())];
        params.extend_from_slice(self.category.facets());
        params.push(("ns_location", self.location.slug()));
        params.extend_from_slice(self.location.facets());

        ListingQuery { params }
    }

    /// Parses the `location\tcategory` form written to the scope file.
    pub fn from_scope_line(line: &str) -> Option<Self> {
        let (location, category) = line.split_once('\t')?;
        let location = Location::from_str(location, false).ok()?;
        let category = Category::from_str(category, false).ok()?;

        Some(FilterCombination::new(location, category))
    }

    pub fn to_scope_line(&self) -> String {
        format!("{}\t{}", self.location.slug(), self.category.slug())
    }
}

impl fmt::Display for FilterCombination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "category='{}' location='{}'",
            self.category.slug(),
            self.location.slug()
        )
    }
}

/// The categories and locations requested for a run. Empty selections widen
/// to every known value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSet {
    categories: Vec<Category>,
    locations: Vec<Location>,
}

impl FilterSet {
    pub fn new(categories: Vec<Category>, locations: Vec<Location>) -> Self {
        let categories = match categories.is_empty() {
            true => Category::ALL.to_vec(),
            false => categories.into_iter().unique().collect(),
        };
        let locations = match locations.is_empty() {
            true => Location::ALL.to_vec(),
            false => locations.into_iter().unique().collect(),
        };

        FilterSet {
            categories,
            locations,
        }
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    /// Every (location, category) pair, locations outermost.
    pub fn combinations(&self) -> Vec<FilterCombination> {
        self.locations
            .iter()
            .cartesian_product(self.categories.iter())
            .map(|(location, category)| FilterCombination::new(*location, *category))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use clap::ValueEnum;

    use super::{Category, FilterCombination, FilterSet, Location};

    #[test]
    fn slugs_match_value_names() {
        for category in Category::ALL {
            let value = category.to_possible_value().unwrap();
            assert_eq!(value.get_name(), category.slug());
        }
        for location in Location::ALL {
            let value = location.to_possible_value().unwrap();
            assert_eq!(value.get_name(), location.slug());
        }
    }

    #[test]
    fn every_category_maps_to_its_facets() {
        let expected: [(Category, &[(&str, &str)]); 16] = [
            (Category::Analyst, &[("cfm4[]", "ANALYS"), ("cfm4[]", "DATA")]),
            (Category::BranchOffice, &[("cfm3[]", "NFC12")]),
            (Category::Collections, &[("cfm4[]", "CREDIT")]),
            (Category::Compliance, &[("cfm4[]", "COMPLI")]),
            (Category::ComptrollerAccounting, &[("cfm4[]", "NFC02")]),
            (Category::ContactCenter, &[("cfm3[]", "NFC18"), ("cfm4[]", "CUSTOM")]),
            (Category::Facilities, &[("cfm4[]", "FACILI")]),
            (Category::HumanResources, &[("cfm3[]", "NFC04")]),
            (Category::InformationTechnology, &[("cfm4[]", "INFORM"), ("cfm4[]", "SOFTWA")]),
            (Category::Internship, &[("cfm4[]", "INTERN")]),
            (Category::Lending, &[("cfm3[]", "NFC09")]),
            (Category::MarketingSocialMedia, &[("cfm4[]", "MARKET")]),
            (Category::Mortgage, &[("cfm4[]", "MORTGE")]),
            (Category::Security, &[("cfm3[]", "NFC14")]),
            (Category::Skillbridge, &[("cfm4[]", "CONTRA"), ("cfm5[]", "T")]),
            (Category::Training, &[("cfm4[]", "EDUCAT")]),
        ];

        for (category, facets) in expected {
            let query = FilterCombination::new(Location::Remote, category).query();
            let mut params = vec![("ns_category", category.slug())];
            params.extend_from_slice(facets);
            params.push(("ns_location", "remote"));
            params.push(("cfm8[]", "NFCU1-RMT"));

            assert_eq!(query.params(), &params[..], "{:?}", category);
        }
    }

    #[test]
    fn every_location_maps_to_its_facets() {
        let expected: [(Location, &[(&str, &str)]); 4] = [
            (Location::PensacolaFl, &[("cfm8[]", "NFCU1-PCC"), ("cfm8[]", "NFCU1-PML")]),
            (Location::ViennaVa, &[("cfm8[]", "NFCU1-HDQ"), ("cfm8[]", "NFCU1-HERN")]),
            (Location::WinchesterVa, &[("cfm8[]", "NFCU1-WCC")]),
            (Location::Remote, &[("cfm8[]", "NFCU1-RMT")]),
        ];

        for (location, facets) in expected {
            let query = FilterCombination::new(location, Category::Lending).query();
            let mut params = vec![
                ("ns_category", "lending"),
                ("cfm3[]", "NFC09"),
                ("ns_location", location.slug()),
            ];
            params.extend_from_slice(facets);

            assert_eq!(query.params(), &params[..], "{:?}", location);
        }
    }

    #[test]
    fn query_contact_center_vienna() {
        let query = FilterCombination::new(Location::ViennaVa, Category::ContactCenter).query();

        assert_eq!(
            query.params(),
            &[
                ("ns_category", "contact-center"),
                ("cfm3[]", "NFC18"),
                ("cfm4[]", "CUSTOM"),
                ("ns_location", "vienna-va"),
                ("cfm8[]", "NFCU1-HDQ"),
                ("cfm8[]", "NFCU1-HERN"),
            ]
        );
    }

    #[test]
    fn query_skillbridge_remote() {
        let query = FilterCombination::new(Location::Remote, Category::Skillbridge).query();

        assert_eq!(
            query.params(),
            &[
                ("ns_category", "skillbridge"),
                ("cfm4[]", "CONTRA"),
                ("cfm5[]", "T"),
                ("ns_location", "remote"),
                ("cfm8[]", "NFCU1-RMT"),
            ]
        );
    }

    #[test]
    fn queries_do_not_leak_between_combinations() {
        let first = FilterCombination::new(Location::PensacolaFl, Category::Skillbridge).query();
        let second = FilterCombination::new(Location::PensacolaFl, Category::Training).query();

        assert!(!second.params().contains(&("cfm5[]", "T")));
        assert_eq!(first.params().len(), 6);
        assert_eq!(second.params().len(), 5);
    }

    #[test]
    fn empty_filter_set_expands_to_everything() {
        let filters = FilterSet::new(vec![], vec![]);

        assert_eq!(filters.categories().len(), 16);
        assert_eq!(filters.locations().len(), 4);
        assert_eq!(filters.combinations().len(), 64);
    }

    #[test]
    fn combinations_iterate_locations_outermost() {
        let filters = FilterSet::new(
            vec![Category::Analyst, Category::Lending],
            vec![Location::Remote, Location::ViennaVa],
        );

        assert_eq!(
            filters.combinations(),
            vec![
                FilterCombination::new(Location::Remote, Category::Analyst),
                FilterCombination::new(Location::Remote, Category::Lending),
                FilterCombination::new(Location::ViennaVa, Category::Analyst),
                FilterCombination::new(Location::ViennaVa, Category::Lending),
            ]
        );
    }

    #[test]
    fn repeated_selections_are_collapsed() {
        let filters = FilterSet::new(
            vec![Category::Mortgage, Category::Mortgage],
            vec![Location::Remote],
        );

        assert_eq!(filters.combinations().len(), 1);
    }

    #[test]
    fn scope_line_parses_back() {
        let combination = FilterCombination::new(Location::WinchesterVa, Category::HumanResources);

        assert_eq!(combination.to_scope_line(), "winchester-va\thuman-resources");
        assert_eq!(
            FilterCombination::from_scope_line(&combination.to_scope_line()),
            Some(combination)
        );
        assert_eq!(FilterCombination::from_scope_line("mars\tanalyst"), None);
        assert_eq!(FilterCombination::from_scope_line("remote"), None);
    }
}
