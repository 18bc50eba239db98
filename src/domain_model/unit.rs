use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Ord, PartialOrd, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct PageSize(pub u16);

/// Zero-based page index plus page size.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub size: PageSize,
}

impl PageRequest {
    pub fn new(page: u32, size: u16) -> Self {
        PageRequest {
            page,
            size: PageSize(size),
        }
    }

    fn offset(&self) -> usize {
        self.page as usize * self.size.0 as usize
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub size: PageSize,
    pub total_elements: u64,
}

impl<T> Page<T> {
    /// Cuts one page out of an already ordered sequence.
    pub fn slice(ordered: Vec<T>, request: PageRequest) -> Self {
        let total_elements = ordered.len() as u64;
        let items = ordered
            .into_iter()
            .skip(request.offset())
            .take(request.size.0 as usize)
            .collect();

        Page {
            items,
            page: request.page,
            size: request.size,
            total_elements,
        }
    }

    pub fn total_pages(&self) -> u64 {
        if self.size.0 == 0 {
            return 0;
        }
        self.total_elements.div_ceil(self.size.0 as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pages_reassemble_the_sequence() {
        let all: Vec<u32> = (0..11).collect();
        let mut joined = Vec::new();
        let mut page = 0;
        loop {
            let p = Page::slice(all.clone(), PageRequest::new(page, 4));
            assert_eq!(p.total_elements, 11);
            assert_eq!(p.total_pages(), 3);
            if p.items.is_empty() {
                break;
            }
            joined.extend(p.items);
            page += 1;
        }
        assert_eq!(joined, all);
        assert_eq!(page, 3);
    }

    #[test]
    fn zero_size_page_is_empty() {
        let p = Page::slice(vec![1, 2, 3], PageRequest::new(0, 0));
        assert!(p.items.is_empty());
        assert_eq!(p.total_elements, 3);
        assert_eq!(p.total_pages(), 0);
    }
}
