//! # Location Resolver
//!
//! Maps free-text place names to canonical [`LocationCode`]s.
//!
//! The lookup is a heuristic, not a geocoder:
//!
//! 1. lower-case and trim the input, then look it up exactly;
//! 2. otherwise return the first table key longer than three characters that
//!    occurs inside the input (`"Shanghai, China"` hits `shanghai`);
//! 3. otherwise report no match.
//!
//! Table order matters for step 2, so entries are kept in insertion order.
//!
//! # Examples
//!
//! ```
//! use freight_quote::domain::services::location_resolver::LocationResolver;
//!
//! let resolver = LocationResolver::default();
//! let a = resolver.resolve("Shanghai, China").unwrap();
//! let b = resolver.resolve("shanghai").unwrap();
//! assert_eq!(a, b);
//! assert!(resolver.resolve("Atlantis").is_none());
//! ```

use crate::domain::value_objects::LocationCode;

/// Built-in port, city and airport table.
const PORTS: &[(&str, &str)] = &[
    // China
    ("shanghai", "CNSHA"),
    ("ningbo", "CNNGB"),
    ("shenzhen", "CNSZX"),
    ("guangzhou", "CNCAN"),
    ("qingdao", "CNQDA"),
    ("tianjin", "CNTXG"),
    ("xiamen", "CNXMN"),
    ("dalian", "CNDLC"),
    ("hong kong", "HKHKG"),
    ("beijing", "CNBJS"),
    // Asia
    ("singapore", "SGSIN"),
    ("tokyo", "JPTYO"),
    ("yokohama", "JPYOK"),
    ("kobe", "JPUKB"),
    ("osaka", "JPOSA"),
    ("busan", "KRPUS"),
    ("ulsan", "KRUSN"),
    ("incheon", "KRINC"),
    ("kaohsiung", "TWKHH"),
    ("keelung", "TWKEL"),
    ("port klang", "MYPKG"),
    ("tanjung pelepas", "MYTPP"),
    ("ho chi minh", "VNSGN"),
    ("hai phong", "VNHPH"),
    ("laem chabang", "THLCH"),
    ("bangkok", "THBKK"),
    ("nhava sheva", "INNSA"),
    ("mumbai", "INBOM"),
    ("chennai", "INMAA"),
    ("mundra", "INMUN"),
    ("colombo", "LKCMB"),
    ("dubai", "AEDXB"),
    ("jebel ali", "AEJEA"),
    // Europe
    ("rotterdam", "NLRTM"),
    ("antwerp", "BEANR"),
    ("hamburg", "DEHAM"),
    ("bremerhaven", "DEBRV"),
    ("felixstowe", "GBFXT"),
    ("southampton", "GBSOU"),
    ("london", "GBLON"),
    ("london gateway", "GBLGP"),
    ("liverpool", "GBLIV"),
    ("le havre", "FRLEH"),
    ("marseille", "FRMRS"),
    ("valencia", "ESVLC"),
    ("barcelona", "ESBCN"),
    ("genoa", "ITGOA"),
    ("la spezia", "ITSPE"),
    ("trieste", "ITTRS"),
    ("piraeus", "GRPIR"),
    ("gdansk", "PLGDN"),
    ("gothenburg", "SEGOT"),
    // North America
    ("los angeles", "USLAX"),
    ("long beach", "USLGB"),
    ("new york", "USNYC"),
    ("newark", "USEWR"),
    ("savannah", "USSAV"),
    ("houston", "USHOU"),
    ("norfolk", "USORF"),
    ("seattle", "USSEA"),
    ("tacoma", "USTIW"),
    ("oakland", "USOAK"),
    ("charleston", "USCHS"),
    ("miami", "USMIA"),
    ("jacksonville", "USJAX"),
    ("vancouver", "CAVAN"),
    ("prince rupert", "CAPRR"),
    ("montreal", "CAMTR"),
    ("toronto", "CATOR"),
    ("halifax", "CAHAL"),
    // Latin America
    ("santos", "BRSSZ"),
    ("buenos aires", "ARBUE"),
    ("callao", "PECLL"),
    ("san antonio", "CLSAI"),
    ("cartagena", "COCTG"),
    ("manzanillo", "MXZLO"),
    ("veracruz", "MXVER"),
    ("balboa", "PABLB"),
    ("colon", "PAONX"),
    // Oceania
    ("sydney", "AUSYD"),
    ("melbourne", "AUMEL"),
    ("brisbane", "AUBNE"),
    ("fremantle", "AUFRE"),
    ("auckland", "NZAKL"),
    ("tauranga", "NZTRG"),
    // Air freight hubs
    ("shanghai pudong", "CNPVG"),
    ("hong kong intl", "HKHKG"),
    ("incheon intl", "KRICN"),
    ("tokyo narita", "JPNRT"),
    ("dubai intl", "AEDXB"),
    ("frankfurt", "DEFRA"),
    ("paris charles de gaulle", "FRCDG"),
    ("paris", "FRPAR"),
    ("london heathrow", "GBLHR"),
    ("amsterdam schiphol", "NLAMS"),
    ("los angeles intl", "USLAX"),
    ("chicago ohare", "USORD"),
    ("new york jfk", "USJFK"),
    ("atlanta hartsfield", "USATL"),
    ("memphis", "USMEM"),
    ("miami intl", "USMIA"),
];

/// Minimum key length considered by the substring scan.
const MIN_SUBSTRING_KEY_LEN: usize = 4;

/// Resolves free-text locations against an ordered name table.
///
/// Stateless after construction and safe to share across tasks.
#[derive(Debug, Clone)]
pub struct LocationResolver {
    entries: Vec<(String, LocationCode)>,
}

impl LocationResolver {
    /// Creates a resolver over a custom ordered table.
    ///
    /// Names are lower-cased; entries with invalid codes are skipped.
    #[must_use]
    pub fn with_entries<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let entries = entries
            .into_iter()
            .filter_map(|(name, code)| {
                LocationCode::new(code)
                    .ok()
                    .map(|code| (name.trim().to_lowercase(), code))
            })
            .collect();
        Self { entries }
    }

    /// Resolves `text` to a location code.
    #[must_use]
    pub fn resolve(&self, text: &str) -> Option<LocationCode> {
        let normalized = text.trim().to_lowercase();
        if normalized.is_empty() {
            return None;
        }

        if let Some((_, code)) = self.entries.iter().find(|(name, _)| *name == normalized) {
            return Some(code.clone());
        }

        self.entries
            .iter()
            .find(|(name, _)| name.len() >= MIN_SUBSTRING_KEY_LEN && normalized.contains(name.as_str()))
            .map(|(_, code)| code.clone())
    }

    /// Number of known names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for LocationResolver {
    fn default() -> Self {
        Self::with_entries(PORTS.iter().copied())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn resolve(text: &str) -> Option<String> {
        LocationResolver::default()
            .resolve(text)
            .map(|c| c.as_str().to_string())
    }

    #[test]
    fn every_builtin_code_is_valid() {
        assert_eq!(LocationResolver::default().len(), PORTS.len());
    }

    #[test]
    fn exact_match_is_case_insensitive() {
        assert_eq!(resolve("  ROTTERDAM ").as_deref(), Some("NLRTM"));
    }

    #[test]
    fn exact_match_beats_substring() {
        assert_eq!(resolve("London Heathrow").as_deref(), Some("GBLHR"));
        assert_eq!(resolve("london gateway").as_deref(), Some("GBLGP"));
    }

    #[test]
    fn substring_uses_table_order() {
        assert_eq!(resolve("Port of London Gateway, UK").as_deref(), Some("GBLON"));
        assert_eq!(resolve("Shanghai, China").as_deref(), Some("CNSHA"));
    }

    #[test]
    fn short_keys_are_not_scanned() {
        let resolver = LocationResolver::with_entries([("rio", "BRRIO")]);
        assert!(resolver.resolve("rio").is_some());
        assert!(resolver.resolve("rio de janeiro").is_none());
    }

    #[test]
    fn unknown_and_blank() {
        assert!(resolve("Atlantis").is_none());
        assert!(resolve("   ").is_none());
    }
}
