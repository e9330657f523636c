//! Root selection: the ordered, paginated slice of root-level items.

use crate::file::{FileRecord, Folder};

use super::item::TreeItem;
use super::query::HierarchyQuery;

/// One page of root items.
#[derive(Debug, Clone)]
pub struct RootPage {
    /// Roots on the requested page, in order.
    pub items: Vec<TreeItem>,
    /// Number of roots matching the filters, across all pages.
    pub total: u64,
}

/// Merge filtered root folders and files, sort them and cut out the
/// requested page.
///
/// Both inputs are expected in id order; folders precede files before
/// sorting, so equal keys keep that order.
pub fn select_roots(folders: Vec<Folder>, files: Vec<FileRecord>, query: &HierarchyQuery) -> RootPage {
    let mut candidates: Vec<TreeItem> = folders
        .into_iter()
        .map(TreeItem::Folder)
        .chain(files.into_iter().map(TreeItem::File))
        .collect();

    query.sort.sort(&mut candidates);

    let total = candidates.len() as u64;
    let items = candidates
        .into_iter()
        .skip(query.offset())
        .take(query.limit as usize)
        .collect();

    RootPage { items, total }
}

/// Number of pages needed for `total` roots.
pub fn total_pages(total: u64, limit: u32) -> u64 {
    if limit == 0 {
        return 0;
    }
    total.div_ceil(limit as u64)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::file::FileType;
    use crate::hierarchy::path::HierarchyPath;
    use crate::hierarchy::query::{SortBy, SortOrder, SortSpec};

    pub(crate) fn folder(id: i64, name: &str, parent: Option<&Folder>, created: &str) -> Folder {
        let hierarchy_path = match parent {
            Some(p) => p.hierarchy_path.child(id),
            None => HierarchyPath::root(id),
        };
        Folder {
            id,
            name: name.to_string(),
            description: None,
            parent_id: parent.map(|p| p.id),
            hierarchy_level: hierarchy_path.level(),
            hierarchy_path,
            created_at: created.to_string(),
            updated_at: created.to_string(),
        }
    }

    pub(crate) fn file(id: i64, name: &str, folder_id: Option<i64>, created: &str) -> FileRecord {
        FileRecord {
            id,
            name: name.to_string(),
            description: None,
            file_type: FileType::Txt,
            file_path: format!("{id}.txt"),
            size: 1,
            folder_id,
            created_at: created.to_string(),
            updated_at: created.to_string(),
        }
    }

    fn query(page: u32, limit: u32, by: SortBy, order: SortOrder) -> HierarchyQuery {
        HierarchyQuery {
            page,
            limit,
            sort: SortSpec::new(by, order),
            ..Default::default()
        }
    }

    fn names(page: &RootPage) -> Vec<&str> {
        page.items.iter().map(|i| i.name()).collect()
    }

    #[test]
    fn test_sort_by_name_mixes_folders_and_files() {
        let folders = vec![
            folder(1, "beta", None, "2024-01-01 00:00:00"),
            folder(2, "Delta", None, "2024-01-02 00:00:00"),
        ];
        let files = vec![
            file(1, "alpha.txt", None, "2024-01-03 00:00:00"),
            file(2, "charlie.txt", None, "2024-01-04 00:00:00"),
        ];

        let page = select_roots(
            folders,
            files,
            &query(1, 10, SortBy::Name, SortOrder::Asc),
        );
        assert_eq!(page.total, 4);
        assert_eq!(names(&page), vec!["alpha.txt", "beta", "charlie.txt", "Delta"]);
    }

    #[test]
    fn test_sort_descending_by_created_at() {
        let folders = vec![
            folder(1, "old", None, "2024-01-01 00:00:00"),
            folder(2, "new", None, "2024-03-01 00:00:00"),
        ];
        let files = vec![file(1, "mid.txt", None, "2024-02-01 00:00:00")];

        let page = select_roots(
            folders,
            files,
            &query(1, 10, SortBy::CreatedAt, SortOrder::Desc),
        );
        assert_eq!(names(&page), vec!["new", "mid.txt", "old"]);
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let ts = "2024-01-01 00:00:00";
        let folders = vec![folder(1, "same", None, ts), folder(2, "Same", None, ts)];
        let files = vec![file(1, "same", None, ts)];

        let page = select_roots(
            folders,
            files,
            &query(1, 10, SortBy::Name, SortOrder::Asc),
        );
        let ids: Vec<(i64, &str)> = page
            .items
            .iter()
            .map(|i| (i.id(), i.name()))
            .collect();
        assert_eq!(ids, vec![(1, "same"), (2, "Same"), (1, "same")]);
        assert!(matches!(page.items[2], TreeItem::File(_)));
    }

    #[test]
    fn test_pages_partition_the_root_set() {
        let folders: Vec<Folder> = (1..=7)
            .map(|i| folder(i, &format!("f{i:02}"), None, "2024-01-01 00:00:00"))
            .collect();
        let files: Vec<FileRecord> = (1..=4)
            .map(|i| file(i, &format!("g{i:02}"), None, "2024-01-01 00:00:00"))
            .collect();

        let full = select_roots(
            folders.clone(),
            files.clone(),
            &query(1, 100, SortBy::Name, SortOrder::Asc),
        );
        let pages = total_pages(full.total, 3);
        assert_eq!(pages, 4);

        let mut concatenated = Vec::new();
        for page in 1..=pages as u32 {
            let slice = select_roots(
                folders.clone(),
                files.clone(),
                &query(page, 3, SortBy::Name, SortOrder::Asc),
            );
            assert_eq!(slice.total, 11);
            concatenated.extend(slice.items.iter().map(|i| (i.kind(), i.id())));
        }
        let expected: Vec<_> = full.items.iter().map(|i| (i.kind(), i.id())).collect();
        assert_eq!(concatenated, expected);
    }

    #[test]
    fn test_page_past_the_end_is_empty() {
        let folders = vec![folder(1, "a", None, "2024-01-01 00:00:00")];
        let page = select_roots(
            folders,
            Vec::new(),
            &query(5, 10, SortBy::Name, SortOrder::Asc),
        );
        assert!(page.items.is_empty());
        assert_eq!(page.total, 1);
    }

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(1, 10), 1);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
    }
}
