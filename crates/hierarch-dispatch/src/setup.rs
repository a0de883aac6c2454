//! Setup phase: turns registered handlers into frozen dispatch tables.

use std::sync::Arc;

use hierarch_authz::ResourceAuthorizer;
use hierarch_core::{
    IdFormat, Method, MethodKey, RepresentationPair, RepresentationRegistry, ResourceChain,
    ResourceId, SetupError, SetupResult,
};
use hierarch_router::Params;
use indexmap::IndexMap;

use crate::handler::{HandlerId, ResourceHandler};
use crate::naming::{path_parameter, validate_resource_type};

/// Name of the version path parameter.
pub(crate) const VERSION_PARAM: &str = "version";

/// A handler as registered on the builder.
pub(crate) struct PendingResource {
    pub(crate) handler: Arc<dyn ResourceHandler>,
    pub(crate) parent: Option<HandlerId>,
}

/// One level of a resource's ancestry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct AncestryLevel {
    pub(crate) resource_type: String,
    pub(crate) param: String,
    pub(crate) id_format: IdFormat,
}

/// Where a matched route leads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RouteTarget {
    pub(crate) resource: usize,
    pub(crate) item: bool,
}

/// A handler together with everything derived from it at setup.
pub(crate) struct RegisteredResource {
    pub(crate) handler: Arc<dyn ResourceHandler>,
    /// Root first; the last level is this resource.
    pub(crate) ancestry: Vec<AncestryLevel>,
    pub(crate) authorizers: IndexMap<MethodKey, ResourceAuthorizer>,
    pub(crate) pairs: IndexMap<(MethodKey, u32), RepresentationPair>,
}

impl RegisteredResource {
    pub(crate) fn resource_type(&self) -> &str {
        self.ancestry
            .last()
            .map_or("", |level| level.resource_type.as_str())
    }

    pub(crate) fn authorizer(&self, method: &MethodKey) -> Option<&ResourceAuthorizer> {
        self.authorizers.get(method)
    }

    pub(crate) fn has_custom_method(&self, name: &str) -> bool {
        self.authorizers.contains_key(&MethodKey::custom(name))
    }

    pub(crate) fn pair(&self, method: &MethodKey, version: u32) -> Option<RepresentationPair> {
        self.pairs.get(&(method.clone(), version)).copied()
    }

    /// `<base>/{version}/<type>/{param}/.../<type>`
    pub(crate) fn collection_pattern(&self, base_path: &str) -> String {
        let mut pattern = format!("{base_path}/{{{VERSION_PARAM}}}");
        if let Some((last, parents)) = self.ancestry.split_last() {
            for level in parents {
                pattern.push_str(&format!("/{}/{{{}}}", level.resource_type, level.param));
            }
            pattern.push('/');
            pattern.push_str(&last.resource_type);
        }
        pattern
    }

    /// The collection pattern followed by this level's id parameter.
    pub(crate) fn item_pattern(&self, base_path: &str) -> String {
        let param = self.ancestry.last().map_or("", |level| level.param.as_str());
        format!("{}/{{{param}}}", self.collection_pattern(base_path))
    }

    /// Builds the request's resource chain, root first.
    ///
    /// Returns `None` if an id does not parse under its level's format.
    pub(crate) fn build_chain(&self, params: &Params, item: bool) -> Option<ResourceChain> {
        let depth = if item {
            self.ancestry.len()
        } else {
            self.ancestry.len().saturating_sub(1)
        };

        let mut chain = ResourceChain::new();
        for level in &self.ancestry[..depth] {
            let raw = params.get(&level.param)?;
            let id = ResourceId::parse(raw, level.id_format)?;
            chain.push(level.resource_type.clone(), id);
        }
        Some(chain.with_target(item))
    }
}

/// Derives the dispatch tables of the handler at `index`.
pub(crate) fn compile(
    pending: &[PendingResource],
    index: usize,
    versions: &[u32],
    registry: &RepresentationRegistry,
) -> SetupResult<RegisteredResource> {
    let handler = Arc::clone(&pending[index].handler);
    let resource_type = handler.resource_type().to_string();
    validate_resource_type(&resource_type)?;

    let ancestry = ancestry(pending, index, &resource_type)?;
    let custom_methods = custom_methods(handler.as_ref(), &resource_type)?;

    let methods: Vec<MethodKey> = Method::ALL
        .into_iter()
        .map(MethodKey::Fixed)
        .chain(custom_methods.into_iter().map(MethodKey::Custom))
        .collect();

    let mut authorizers = IndexMap::new();
    let mut pairs = IndexMap::new();
    for method in methods {
        for &version in versions {
            let pair = match &method {
                MethodKey::Fixed(fixed) => handler.representations(*fixed, version),
                MethodKey::Custom(name) => handler.custom_representations(name, version),
            };
            let Some(pair) = pair else { continue };
            if let Some(request) = pair.request {
                if !registry.contains(&request) {
                    return Err(SetupError::unregistered_representation(
                        request.name(),
                        resource_type.clone(),
                    ));
                }
            }
            pairs.insert((method.clone(), version), pair);
        }

        let access = handler.access(&method);
        authorizers.insert(method.clone(), ResourceAuthorizer::new(method, access));
    }

    tracing::debug!(
        resource = %resource_type,
        depth = ancestry.len(),
        contracts = pairs.len(),
        "resource compiled"
    );

    Ok(RegisteredResource {
        handler,
        ancestry,
        authorizers,
        pairs,
    })
}

fn ancestry(
    pending: &[PendingResource],
    index: usize,
    resource_type: &str,
) -> SetupResult<Vec<AncestryLevel>> {
    let mut indices = vec![index];
    let mut current = index;
    while let Some(parent) = pending[current].parent {
        let parent = parent.index();
        if parent >= pending.len() {
            return Err(SetupError::UnknownParent {
                index: parent,
                resource: resource_type.to_string(),
            });
        }
        if indices.contains(&parent) {
            return Err(SetupError::CyclicAncestry {
                resource: resource_type.to_string(),
            });
        }
        indices.push(parent);
        current = parent;
    }
    indices.reverse();

    let mut levels: Vec<AncestryLevel> = Vec::with_capacity(indices.len());
    for i in indices {
        let handler = &pending[i].handler;
        let level_type = handler.resource_type();
        validate_resource_type(level_type)?;
        let param = path_parameter(level_type);
        if levels.iter().any(|level| level.param == param) {
            return Err(SetupError::DuplicatePathParameter {
                param,
                resource: resource_type.to_string(),
            });
        }
        levels.push(AncestryLevel {
            resource_type: level_type.to_string(),
            param,
            id_format: handler.id_format(),
        });
    }
    Ok(levels)
}

fn custom_methods(handler: &dyn ResourceHandler, resource_type: &str) -> SetupResult<Vec<String>> {
    let mut names: Vec<String> = Vec::new();
    for name in handler.custom_methods() {
        if Method::from_name(&name).is_some() {
            return Err(SetupError::CustomMethodCollision {
                name,
                resource: resource_type.to_string(),
            });
        }
        if names.contains(&name) {
            return Err(SetupError::DuplicateCustomMethod {
                name,
                resource: resource_type.to_string(),
            });
        }
        names.push(name);
    }
    Ok(names)
}
