use crate::origin::Origin;

/// True when the origin's name is one of the keywords, compared byte for byte.
///
/// An origin without a name never matches, even against an empty keyword.
pub fn matches(origin: &Origin, keywords: &[String]) -> bool {
    if origin.name.is_empty() {
        return false;
    }
    keywords.iter().any(|keyword| *keyword == origin.name)
}
