use super::config::PaginationConfig;

/// Walks zero-based listing pages until the server runs out or the cap is hit
pub struct PageIterator {
    current_page: usize,
    config: PaginationConfig,
}

impl PageIterator {
    pub fn new(config: PaginationConfig) -> Self {
        Self {
            current_page: 0,
            config,
        }
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn page_size(&self) -> usize {
        self.config.page_size
    }

    pub fn has_reached_max(&self) -> bool {
        self.config
            .max_pages
            .is_some_and(|max| self.current_page >= max)
    }

    pub fn advance(&mut self) {
        self.current_page += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stops_at_max_pages() {
        let mut pages = PageIterator::new(PaginationConfig::new(20).with_max_pages(2));
        assert!(!pages.has_reached_max());
        pages.advance();
        pages.advance();
        assert!(pages.has_reached_max());
        assert_eq!(pages.current_page(), 2);
    }

    #[test]
    fn unbounded_by_default() {
        let mut pages = PageIterator::new(PaginationConfig::default());
        for _ in 0..100 {
            pages.advance();
        }
        assert!(!pages.has_reached_max());
        assert_eq!(pages.page_size(), 50);
    }
}
