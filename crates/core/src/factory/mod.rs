//! Instance factories
//!
//! Turn a node plus a value accessor into a filled entity instance.
//!
//! # Architecture
//!
//! ```text
//! create_instance::<T>(node, accessor, scope)
//!          │
//!          ▼
//!  resolve_properties::<T>().has_deferred()?
//!          │                         │
//!        false                      true
//!          ▼                         ▼
//!   DirectFactory              LazyFactory
//!   construct + fill all       construct + fill eager subset
//!                              + bind Deferred<T> cells
//! ```
//!
//! Both strategies share the eager fill: each property's raw value is
//! fetched with `recursive = true` and coerced. A property whose value
//! cannot be coerced is logged and left at its default; only construction
//! failures abort the call.

mod direct;
mod lazy;

use std::sync::Arc;

use tracing::{debug, warn};
use vault_sdk::{ContentNode, RawValue};

use crate::context::VaultContext;
use crate::error::{CoercionError, VaultResult};
use crate::schema::{resolve_properties, Entity, ResolvedPropertySet};

pub use direct::DirectFactory;
pub use lazy::LazyFactory;

/// Property value accessor bound to one node
///
/// Called with the property's source alias and the recursive flag.
pub type Accessor = Arc<dyn Fn(&str, bool) -> RawValue + Send + Sync>;

/// A strategy for building filled instances
pub trait InstanceFactory {
    /// Construct a `T` for `node` and fill it through `accessor`
    fn create<T: Entity>(
        &self,
        node: &ContentNode,
        accessor: &Accessor,
        scope: &VaultContext,
    ) -> VaultResult<T>;
}

/// Build a filled `T`, choosing the lazy strategy when `T` has deferred properties
pub fn create_instance<T: Entity>(
    node: &ContentNode,
    accessor: &Accessor,
    scope: &VaultContext,
) -> VaultResult<T> {
    if resolve_properties::<T>().has_deferred() {
        LazyFactory.create(node, accessor, scope)
    } else {
        DirectFactory.create(node, accessor, scope)
    }
}

/// Fill every non-deferred property of `instance`
fn fill_eager<T: Entity>(
    instance: &mut T,
    properties: &ResolvedPropertySet,
    accessor: &Accessor,
    scope: &VaultContext,
) {
    for property in properties.eager() {
        let raw = accessor(property.alias, true);
        match instance.assign(property.name, raw, scope) {
            Ok(true) => {}
            Ok(false) => debug!(
                "{} has no assignable property {}",
                T::type_info().name,
                property.name
            ),
            Err(CoercionError::Empty { .. }) => debug!(
                "No value for {}.{}; left at default",
                T::type_info().name,
                property.name
            ),
            Err(e) => warn!(
                "Failed to map {}.{} from '{}': {}",
                T::type_info().name,
                property.name,
                property.alias,
                e
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use vault_sdk::ContentSource;

    use crate::deferred::{Deferred, DeferredSource};
    use crate::error::VaultError;
    use crate::memory::MemoryContentSource;
    use crate::schema::{EntityMarker, PropertyDecl, PropertyFlags, TypeInfo};
    use crate::VaultEntity;

    #[derive(Debug, Default, VaultEntity)]
    #[vault(entity(auto_map))]
    struct DocumentModel {
        introduction: String,
        body: String,
        #[vault(alias = "imageUrl")]
        image_url: String,
        button_text: Deferred<String>,
        #[vault(exclude)]
        ignore: String,
    }

    #[derive(Debug, Default, VaultEntity)]
    #[vault(entity(auto_map))]
    struct EagerModel {
        #[vault(node)]
        node: ContentNode,
        title: String,
        count: i32,
        button_text: Deferred<String>,
    }

    fn source() -> Arc<MemoryContentSource> {
        Arc::new(
            MemoryContentSource::new()
                .with_node(ContentNode::content(1000, "home"))
                .with_node(ContentNode::content(1050, "document").with_parent(1000))
                .with_value(1050, "introduction", "Hello")
                .with_value(1050, "body", "<p>Body</p>")
                .with_value(1050, "imageUrl", "/media/hero.jpg")
                .with_value(1050, "button_text", "Read more")
                .with_value(1050, "ignore", "never")
                .with_value(1050, "title", "Title")
                .with_value(1050, "count", "not a number")
                .with_value(1000, "introduction", "Inherited"),
        )
    }

    fn accessor(source: &Arc<MemoryContentSource>, node: &ContentNode) -> Accessor {
        let source = Arc::clone(source);
        let node = node.clone();
        Arc::new(move |alias: &str, recursive: bool| source.property_value(&node, alias, recursive))
    }

    #[test]
    fn test_lazy_strategy_defers_virtual_property() {
        let source = source();
        let scope = VaultContext::new(source.clone());
        let node = source.content_by_id(1050).unwrap();

        let model: DocumentModel = create_instance(&node, &accessor(&source, &node), &scope).unwrap();

        assert_eq!(model.introduction, "Hello");
        assert_eq!(model.body, "<p>Body</p>");
        assert_eq!(model.image_url, "/media/hero.jpg");
        assert_eq!(model.ignore, "");
        assert!(model.button_text.is_bound());
        assert!(!model.button_text.is_resolved());
        assert_eq!(source.read_count(1050, "button_text"), 0);
        assert_eq!(source.read_count(1050, "ignore"), 0);

        assert_eq!(model.button_text.get(), "Read more");
        assert_eq!(model.button_text.get(), "Read more");
        assert_eq!(source.read_count(1050, "button_text"), 1);
        assert_eq!(source.read_count(1050, "introduction"), 1);
    }

    #[test]
    fn test_direct_strategy_leaves_deferred_unbound() {
        let source = source();
        let scope = VaultContext::new(source.clone());
        let node = source.content_by_id(1050).unwrap();

        let model: EagerModel = DirectFactory
            .create(&node, &accessor(&source, &node), &scope)
            .unwrap();

        assert_eq!(model.node.id, 1050);
        assert_eq!(model.title, "Title");
        assert!(!model.button_text.is_bound());
        assert_eq!(source.read_count(1050, "button_text"), 0);
    }

    #[test]
    fn test_coercion_failure_is_isolated() {
        let source = source();
        let scope = VaultContext::new(source.clone());
        let node = source.content_by_id(1050).unwrap();

        let model: EagerModel = create_instance(&node, &accessor(&source, &node), &scope).unwrap();

        assert_eq!(model.count, 0);
        assert_eq!(model.title, "Title");
        assert_eq!(model.button_text.get(), "Read more");
    }

    #[test]
    fn test_accessor_requests_recursive_values() {
        let source = source();
        let scope = VaultContext::new(source.clone());
        let node = ContentNode::content(1051, "document").with_parent(1000);
        source.insert_node(node.clone());

        let model: DocumentModel = create_instance(&node, &accessor(&source, &node), &scope).unwrap();
        assert_eq!(model.introduction, "Inherited");
    }

    #[derive(Debug, Default, VaultEntity)]
    struct SeoFields {
        meta_title: String,
        share_text: Deferred<String>,
    }

    #[derive(Debug, Default, VaultEntity)]
    #[vault(entity(auto_map))]
    struct SeoPage {
        #[vault(base)]
        seo: SeoFields,
        title: String,
    }

    #[test]
    fn test_base_fields_are_filled_and_bound() {
        let source = source();
        source.set_value(1050, "meta_title", "Meta");
        source.set_value(1050, "share_text", "Share this");
        let scope = VaultContext::new(source.clone());
        let node = source.content_by_id(1050).unwrap();

        let page: SeoPage = create_instance(&node, &accessor(&source, &node), &scope).unwrap();

        assert_eq!(page.title, "Title");
        assert_eq!(page.seo.meta_title, "Meta");
        assert!(page.seo.share_text.is_bound());
        assert_eq!(source.read_count(1050, "share_text"), 0);

        assert_eq!(page.seo.share_text.get(), "Share this");
        assert_eq!(page.seo.share_text.get(), "Share this");
        assert_eq!(source.read_count(1050, "share_text"), 1);
    }

    struct Unbuildable;

    impl Entity for Unbuildable {
        fn type_info() -> &'static TypeInfo {
            static PROPERTIES: [PropertyDecl; 1] =
                [PropertyDecl::new("value").with_flags(PropertyFlags::INCLUDE)];
            static INFO: TypeInfo = TypeInfo {
                name: "Unbuildable",
                marker: Some(EntityMarker::content(false)),
                properties: &PROPERTIES,
                base: None,
            };
            &INFO
        }

        fn construct(node: &ContentNode) -> VaultResult<Self> {
            Err(VaultError::NoConstructor {
                type_name: "Unbuildable",
                node_id: node.id,
            })
        }

        fn assign(
            &mut self,
            _property: &str,
            _raw: RawValue,
            _scope: &VaultContext,
        ) -> Result<bool, CoercionError> {
            Ok(false)
        }

        fn bind_deferred(&mut self, _property: &str, _source: DeferredSource) -> bool {
            false
        }
    }

    #[test]
    fn test_construction_error_propagates() {
        let source = source();
        let scope = VaultContext::new(source.clone());
        let node = source.content_by_id(1050).unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let accessor: Accessor = Arc::new(move |_: &str, _: bool| {
            counter.fetch_add(1, Ordering::SeqCst);
            RawValue::Null
        });

        let result = create_instance::<Unbuildable>(&node, &accessor, &scope);

        assert!(matches!(
            result,
            Err(VaultError::NoConstructor { node_id: 1050, .. })
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
