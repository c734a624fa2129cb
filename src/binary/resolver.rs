use std::collections::HashMap;

/// Resolves binary 16 bit token ids to field names
///
/// The dictionaries that ship with community tooling are incomplete by
/// design; the parser falls back to the decimal form of any id a resolver
/// cannot answer for.
pub trait TokenResolver {
    /// Returns the name belonging to the given token id, if known
    fn resolve(&self, token: u16) -> Option<&str>;
}

impl<S, V> TokenResolver for HashMap<u16, V, S>
where
    S: std::hash::BuildHasher,
    V: AsRef<str>,
{
    fn resolve(&self, token: u16) -> Option<&str> {
        self.get(&token).map(|x| x.as_ref())
    }
}

impl<T: TokenResolver + ?Sized> TokenResolver for &'_ T {
    fn resolve(&self, token: u16) -> Option<&str> {
        (**self).resolve(token)
    }
}

impl<T: TokenResolver + ?Sized> TokenResolver for Box<T> {
    fn resolve(&self, token: u16) -> Option<&str> {
        (**self).resolve(token)
    }
}

/// A resolver that knows no tokens, forcing the decimal fallback for all ids
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptyTokenResolver;

impl TokenResolver for EmptyTokenResolver {
    fn resolve(&self, _token: u16) -> Option<&str> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hashmap_resolver() {
        let mut map = HashMap::new();
        map.insert(0x284d, "date");
        assert_eq!(map.resolve(0x284d), Some("date"));
        assert_eq!(map.resolve(0x0000), None);
        assert_eq!((&map).resolve(0x284d), Some("date"));
    }

    #[test]
    fn test_empty_resolver() {
        assert_eq!(EmptyTokenResolver.resolve(0x284d), None);
    }
}
