//! Base-class resolution across the merged model.

use tracing::debug;

use super::SymbolResolver;
use crate::model::{ElementData, ElementId, ElementKind, ModelMap};

/// Moves resolvable names out of every class's `unresolved_base_classes`
/// into its `base_classes` mapping.
///
/// Names that stay unresolved (external libraries, typos) remain listed for
/// later inspection; the two collections are disjoint afterwards.
pub struct HierarchyResolver;

impl HierarchyResolver {
    pub fn run(models: &mut ModelMap) {
        let mut updates: Vec<(ElementId, String, ElementId)> = Vec::new();
        {
            let resolver = SymbolResolver::new(models);
            for (class_id, element) in models.iter() {
                let ElementData::Class {
                    unresolved_base_classes,
                    ..
                } = element.data()
                else {
                    continue;
                };
                if unresolved_base_classes.is_empty() {
                    continue;
                }
                let Some(module_id) = models.parent_module_of(class_id) else {
                    continue;
                };
                for base_name in unresolved_base_classes {
                    if let Some(target) =
                        resolver.resolve(base_name, &module_id, Some(ElementKind::Class))
                    {
                        updates.push((class_id.clone(), base_name.clone(), target));
                    }
                }
            }
        }

        debug!(resolved = updates.len(), "base-class resolution complete");

        for (class_id, base_name, target) in updates {
            if let Some(ElementData::Class {
                base_classes,
                unresolved_base_classes,
                ..
            }) = models.get_mut(&class_id).map(|e| e.data_mut())
            {
                unresolved_base_classes.retain(|b| b != &base_name);
                base_classes.insert(base_name, target);
            }
        }
    }
}
