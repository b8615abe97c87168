//! Honorific phrases and their preview images

use std::collections::HashMap;
use tracing::debug;

/// A fixed honorific phrase inserted as an inline atom
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Honorific {
    pub key: &'static str,
    /// Arabic text written into the document
    pub text: &'static str,
    /// English meaning, shown as the title
    pub label: &'static str,
}

pub const HONORIFICS: &[Honorific] = &[
    Honorific {
        key: "saw",
        text: "ﷺ",
        label: "Peace and blessings be upon him",
    },
    Honorific {
        key: "as",
        text: "عليه السلام",
        label: "Peace be upon him",
    },
    Honorific {
        key: "ra",
        text: "رضي الله عنه",
        label: "May Allah be pleased with him",
    },
    Honorific {
        key: "raha",
        text: "رضي الله عنها",
        label: "May Allah be pleased with her",
    },
    Honorific {
        key: "rahum",
        text: "رضي الله عنهم",
        label: "May Allah be pleased with them",
    },
    Honorific {
        key: "rh",
        text: "رحمه الله",
        label: "May Allah have mercy on him",
    },
    Honorific {
        key: "swt",
        text: "سبحانه وتعالى",
        label: "Glorified and exalted is He",
    },
    Honorific {
        key: "jj",
        text: "جل جلاله",
        label: "Exalted is His majesty",
    },
];

pub fn honorific(key: &str) -> Option<&'static Honorific> {
    HONORIFICS.iter().find(|h| h.key == key)
}

/// Supplies SVG markup for an honorific key
pub trait SvgSource: Send + Sync {
    fn load_svg(&self, key: &str) -> Option<String>;
}

/// Unbounded cache of honorific previews; the table is small and fixed
pub struct HonorificPreviewCache {
    source: Box<dyn SvgSource>,
    entries: HashMap<String, String>,
}

impl HonorificPreviewCache {
    pub fn new(source: impl SvgSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            entries: HashMap::new(),
        }
    }

    /// Cached preview, loading it on first use. Failed loads are not cached.
    pub fn get(&mut self, key: &str) -> Option<&str> {
        if !self.entries.contains_key(key) {
            let svg = self.source.load_svg(key)?;
            debug!(key, bytes = svg.len(), "caching honorific preview");
            self.entries.insert(key.to_string(), svg);
        }
        self.entries.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingSource {
        loads: Arc<AtomicUsize>,
    }

    impl SvgSource for CountingSource {
        fn load_svg(&self, key: &str) -> Option<String> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            honorific(key).map(|h| format!("<svg><title>{}</title></svg>", h.label))
        }
    }

    #[test]
    fn test_table_keys_are_unique() {
        for (i, a) in HONORIFICS.iter().enumerate() {
            assert!(HONORIFICS[i + 1..].iter().all(|b| b.key != a.key));
        }
        assert_eq!(honorific("swt").unwrap().text, "سبحانه وتعالى");
        assert!(honorific("nope").is_none());
    }

    #[test]
    fn test_cache_loads_once() {
        let loads = Arc::new(AtomicUsize::new(0));
        let mut cache = HonorificPreviewCache::new(CountingSource { loads: loads.clone() });

        assert!(cache.get("saw").unwrap().starts_with("<svg>"));
        assert!(cache.get("saw").is_some());
        assert_eq!(loads.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_missing_preview_is_retried() {
        let loads = Arc::new(AtomicUsize::new(0));
        let mut cache = HonorificPreviewCache::new(CountingSource { loads: loads.clone() });
        assert!(cache.get("unknown").is_none());
        assert!(cache.get("unknown").is_none());
        assert_eq!(loads.load(Ordering::SeqCst), 2);
        assert!(cache.is_empty());
    }
}
