//! The closed set of administrative regions results are queried for.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// One first-level administrative division, plus the cross-border
/// pseudo-region for votes cast abroad.
///
/// The set is closed: the upstream source reports exactly these 19 entries
/// and nothing else. Display names match the upstream dropdown (uppercase,
/// no accents), which is also how regions are keyed in the cache document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    Atlantida,
    Colon,
    Comayagua,
    Copan,
    Cortes,
    Choluteca,
    ElParaiso,
    FranciscoMorazan,
    GraciasADios,
    Intibuca,
    IslasDeLaBahia,
    LaPaz,
    Lempira,
    Ocotepeque,
    Olancho,
    SantaBarbara,
    Valle,
    Yoro,
    /// Votes cast abroad. Legitimately low-turnout: accepted with zero total
    /// votes, and queried with a single attempt.
    VotoExterior,
}

impl Region {
    /// All regions in upstream dropdown order. This is the order the
    /// acquisition loop visits them in.
    pub const ALL: [Region; 19] = [
        Region::Atlantida,
        Region::Colon,
        Region::Comayagua,
        Region::Copan,
        Region::Cortes,
        Region::Choluteca,
        Region::ElParaiso,
        Region::FranciscoMorazan,
        Region::GraciasADios,
        Region::Intibuca,
        Region::IslasDeLaBahia,
        Region::LaPaz,
        Region::Lempira,
        Region::Ocotepeque,
        Region::Olancho,
        Region::SantaBarbara,
        Region::Valle,
        Region::Yoro,
        Region::VotoExterior,
    ];

    /// Upstream display name.
    pub fn name(&self) -> &'static str {
        match self {
            Region::Atlantida => "ATLANTIDA",
            Region::Colon => "COLON",
            Region::Comayagua => "COMAYAGUA",
            Region::Copan => "COPAN",
            Region::Cortes => "CORTES",
            Region::Choluteca => "CHOLUTECA",
            Region::ElParaiso => "EL PARAISO",
            Region::FranciscoMorazan => "FRANCISCO MORAZAN",
            Region::GraciasADios => "GRACIAS A DIOS",
            Region::Intibuca => "INTIBUCA",
            Region::IslasDeLaBahia => "ISLAS DE LA BAHIA",
            Region::LaPaz => "LA PAZ",
            Region::Lempira => "LEMPIRA",
            Region::Ocotepeque => "OCOTEPEQUE",
            Region::Olancho => "OLANCHO",
            Region::SantaBarbara => "SANTA BARBARA",
            Region::Valle => "VALLE",
            Region::Yoro => "YORO",
            Region::VotoExterior => "VOTO EN EL EXTERIOR",
        }
    }

    /// Whether this is the cross-border pseudo-region, which follows the
    /// relaxed acceptance rule (zero total votes allowed, single attempt).
    pub fn is_exterior(&self) -> bool {
        matches!(self, Region::VotoExterior)
    }

    /// Resolve an upstream display name (case-insensitive).
    pub fn from_name(name: &str) -> Option<Region> {
        let wanted = name.trim();
        Region::ALL
            .iter()
            .copied()
            .find(|r| r.name().eq_ignore_ascii_case(wanted))
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for Region {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Region {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Region::from_name(&name)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown region: {name}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_set_is_nineteen_entries() {
        assert_eq!(Region::ALL.len(), 19);
        let exterior = Region::ALL.iter().filter(|r| r.is_exterior()).count();
        assert_eq!(exterior, 1);
    }

    #[test]
    fn names_round_trip() {
        for region in Region::ALL {
            assert_eq!(Region::from_name(region.name()), Some(region));
        }
        assert_eq!(Region::from_name("francisco morazan"), Some(Region::FranciscoMorazan));
        assert_eq!(Region::from_name("NACIONAL"), None);
    }

    #[test]
    fn serde_uses_display_names() {
        let json = serde_json::to_string(&Region::VotoExterior).unwrap();
        assert_eq!(json, "\"VOTO EN EL EXTERIOR\"");
        let back: Region = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Region::VotoExterior);
    }
}
