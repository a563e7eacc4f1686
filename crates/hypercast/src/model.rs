use crate::error::{Error, Result};
use crate::path::Path;
use std::any::{Any, TypeId};
use std::fmt;

/// Runtime type token for a model.
///
/// Registrations and relations carry a `ModelType` explicitly, so nothing
/// ever needs to recover a generic parameter at runtime.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModelType {
    id: TypeId,
    name: &'static str,
}

impl ModelType {
    pub fn of<T: Any>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.id
    }

    /// Fully qualified Rust type name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Type name without its module path.
    pub fn short_name(&self) -> &'static str {
        self.name.rsplit("::").next().unwrap_or(self.name)
    }
}

impl fmt::Debug for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ModelType({})", self.name)
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A model instance paired with its type token.
pub struct SingleModel {
    model: Box<dyn Any>,
    model_type: ModelType,
}

impl SingleModel {
    pub fn new<T: Any>(model: T) -> Self {
        Self {
            model: Box::new(model),
            model_type: ModelType::of::<T>(),
        }
    }

    pub fn model(&self) -> &dyn Any {
        self.model.as_ref()
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.model.downcast_ref::<T>()
    }

    pub fn model_type(&self) -> ModelType {
        self.model_type
    }
}

impl fmt::Debug for SingleModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SingleModel")
            .field("model_type", &self.model_type)
            .finish_non_exhaustive()
    }
}

/// One page of a collection.
///
/// ```
/// use hypercast::v1::Page;
///
/// let page = Page::new(vec![11, 12, 13, 14, 15, 16, 17, 18, 19, 20], 25, 2, 10, None).unwrap();
/// assert_eq!(page.last_page_number(), 3);
/// assert!(page.has_previous());
/// assert!(page.has_next());
/// ```
#[derive(Debug, Clone)]
pub struct Page<T> {
    items: Vec<T>,
    total_count: usize,
    page_number: usize,
    items_per_page: usize,
    path: Option<Path>,
}

impl<T: Any> Page<T> {
    /// Build a page, rejecting page numbers outside `1..=last_page_number`.
    ///
    /// `path` names the resource the collection hangs from; `None` for
    /// collections off the API root.
    pub fn new(
        items: Vec<T>,
        total_count: usize,
        page_number: usize,
        items_per_page: usize,
        path: Option<Path>,
    ) -> Result<Self> {
        let last = last_page_number(total_count, items_per_page);
        if page_number < 1 || page_number > last {
            return Err(Error::BadRequest(format!(
                "page {} is outside 1..={}",
                page_number, last
            )));
        }
        Ok(Self {
            items,
            total_count,
            page_number,
            items_per_page,
            path,
        })
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn total_count(&self) -> usize {
        self.total_count
    }

    pub fn page_number(&self) -> usize {
        self.page_number
    }

    pub fn items_per_page(&self) -> usize {
        self.items_per_page
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_ref()
    }

    pub fn model_type(&self) -> ModelType {
        ModelType::of::<T>()
    }

    pub fn last_page_number(&self) -> usize {
        last_page_number(self.total_count, self.items_per_page)
    }

    pub fn has_previous(&self) -> bool {
        self.page_number > 1
    }

    pub fn has_next(&self) -> bool {
        self.page_number < self.last_page_number()
    }

    pub fn info(&self) -> PageInfo {
        PageInfo {
            model_type: self.model_type(),
            page_number: self.page_number,
            items_per_page: self.items_per_page,
            total_count: self.total_count,
            item_count: self.items.len(),
            last_page_number: self.last_page_number(),
        }
    }
}

/// Type-independent summary of a [`Page`], handed to page mappers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageInfo {
    pub model_type: ModelType,
    pub page_number: usize,
    pub items_per_page: usize,
    pub total_count: usize,
    pub item_count: usize,
    pub last_page_number: usize,
}

fn last_page_number(total_count: usize, items_per_page: usize) -> usize {
    if items_per_page == 0 {
        return 1;
    }
    total_count.div_ceil(items_per_page).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_math_middle_page() {
        let page = Page::new((11..=20).collect::<Vec<i32>>(), 25, 2, 10, None).unwrap();
        assert_eq!(page.last_page_number(), 3);
        assert!(page.has_previous());
        assert!(page.has_next());
    }

    #[test]
    fn test_pagination_first_and_last() {
        let first = Page::new(vec![1, 2], 4, 1, 2, None).unwrap();
        assert!(!first.has_previous());
        assert!(first.has_next());

        let last = Page::new(vec![3, 4], 4, 2, 2, None).unwrap();
        assert!(last.has_previous());
        assert!(!last.has_next());
    }

    #[test]
    fn test_empty_collection_has_one_page() {
        let page: Page<i32> = Page::new(vec![], 0, 1, 10, None).unwrap();
        assert_eq!(page.last_page_number(), 1);
        assert!(!page.has_next());
        assert!(!page.has_previous());
    }

    #[test]
    fn test_zero_per_page_has_one_page() {
        let page: Page<i32> = Page::new(vec![], 30, 1, 0, None).unwrap();
        assert_eq!(page.last_page_number(), 1);
    }

    #[test]
    fn test_page_out_of_range_is_client_error() {
        let err = Page::new(vec![1], 5, 4, 2, None).unwrap_err();
        assert!(err.is_client_error());

        let err = Page::new(vec![1], 5, 0, 2, None).unwrap_err();
        assert!(err.is_client_error());
    }

    #[test]
    fn test_page_info() {
        let page = Page::new(vec!["a", "b"], 7, 1, 2, None).unwrap();
        let info = page.info();
        assert_eq!(info.item_count, 2);
        assert_eq!(info.total_count, 7);
        assert_eq!(info.last_page_number, 4);
        assert_eq!(info.model_type, ModelType::of::<&str>());
    }

    #[test]
    fn test_single_model_downcast() {
        let model = SingleModel::new(String::from("hello"));
        assert_eq!(model.model_type(), ModelType::of::<String>());
        assert_eq!(model.downcast_ref::<String>().unwrap(), "hello");
        assert!(model.downcast_ref::<i32>().is_none());
    }

    #[test]
    fn test_model_type_short_name() {
        assert_eq!(ModelType::of::<String>().short_name(), "String");
    }
}
