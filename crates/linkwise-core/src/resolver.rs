//! One-call resolution of a component's build configuration.
//!
//! Pipeline, all or nothing:
//! 1. closure of the component (cycle check)
//! 2. designated upstream located among its dependencies
//! 3. declared conflict rules, then the compiler-family check
//! 4. language standard read from the upstream
//! 5. include directory from the optional include provider
//! 6. implicit runtime library searched in the upstream's closure
//! 7. argument and environment assembly

use std::fmt;

use linkwise_common::config::ResolverConfig;
use linkwise_common::error::{LinkwiseError, Result};
use linkwise_common::types::{CompilerIdentity, ComponentName, prefix_join};

use crate::arguments::{BuildArgumentBuilder, BuildInputs, ResolvedConfiguration, RuntimeLinkage};
use crate::component::Component;
use crate::finder;
use crate::graph::DependencyGraph;
use crate::toolchain::{self, ConflictRule};
use crate::variant;

/// Predicate identifying the implicit runtime dependency.
pub type Predicate = Box<dyn Fn(&Component) -> bool + Send + Sync>;

/// What to resolve.
#[derive(Debug, Clone)]
pub struct ResolutionRequest {
    /// Component under build.
    pub component: ComponentName,
    /// Designated upstream; falls back to the configured default.
    pub upstream: Option<ComponentName>,
    /// Component whose headers are added to the raw flags; falls back to
    /// the configured default.
    pub include_provider: Option<ComponentName>,
    /// Declared incompatibilities of the component under build.
    pub conflicts: Vec<ConflictRule>,
    /// Compiler to use instead of the one recorded on the component.
    pub compiler: Option<CompilerIdentity>,
}

impl ResolutionRequest {
    /// Creates a request for `component` with every option defaulted.
    #[must_use]
    pub fn new(component: impl Into<ComponentName>) -> Self {
        Self {
            component: component.into(),
            upstream: None,
            include_provider: None,
            conflicts: Vec::new(),
            compiler: None,
        }
    }

    /// Sets the designated upstream.
    #[must_use]
    pub fn upstream(mut self, name: impl Into<ComponentName>) -> Self {
        self.upstream = Some(name.into());
        self
    }

    /// Sets the include provider.
    #[must_use]
    pub fn include_provider(mut self, name: impl Into<ComponentName>) -> Self {
        self.include_provider = Some(name.into());
        self
    }

    /// Attaches declared conflict rules.
    #[must_use]
    pub fn conflicts(mut self, rules: Vec<ConflictRule>) -> Self {
        self.conflicts = rules;
        self
    }

    /// Overrides the compiler of the current build.
    #[must_use]
    pub fn compiler(mut self, compiler: CompilerIdentity) -> Self {
        self.compiler = Some(compiler);
        self
    }
}

/// Resolver bound to a configuration and a runtime predicate.
pub struct Resolver {
    config: ResolverConfig,
    predicate: Predicate,
    builder: BuildArgumentBuilder,
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Components resolved for one request, shared by `check` and `resolve`.
struct Context<'g> {
    graph: &'g DependencyGraph,
    component: &'g Component,
    upstream: &'g Component,
    compiler: CompilerIdentity,
}

impl Resolver {
    /// Creates a resolver that treats components matching `predicate` as
    /// the implicit runtime library.
    pub fn new<P>(config: ResolverConfig, predicate: P) -> Self
    where
        P: Fn(&Component) -> bool + Send + Sync + 'static,
    {
        let builder = BuildArgumentBuilder::new(RuntimeLinkage::from_config(&config));
        Self {
            config,
            predicate: Box::new(predicate),
            builder,
        }
    }

    /// Creates a resolver whose runtime predicate matches the configured
    /// runtime component name.
    #[must_use]
    pub fn from_config(config: ResolverConfig) -> Self {
        let predicate = finder::named(config.runtime_component.clone());
        Self::new(config, predicate)
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Runs only the conflict checks for `request`.
    ///
    /// # Errors
    ///
    /// Returns a graph, not-found, configuration, or conflict error.
    pub fn check(&self, graph: &DependencyGraph, request: &ResolutionRequest) -> Result<()> {
        let ctx = self.context(graph, request)?;
        toolchain::check(&ctx.compiler.family, ctx.upstream)
    }

    /// Resolves the full build configuration for `request`.
    ///
    /// # Errors
    ///
    /// Returns a graph, not-found, configuration, or conflict error; no
    /// partial configuration is ever returned.
    pub fn resolve(
        &self,
        graph: &DependencyGraph,
        request: &ResolutionRequest,
    ) -> Result<ResolvedConfiguration> {
        tracing::info!(component = %request.component, "resolving build configuration");
        let ctx = self.context(graph, request)?;

        let cxx_standard = variant::get(ctx.upstream, &self.config.standard_variant);
        let include_dir = self.include_dir(&ctx, request)?;

        let upstream_idx = graph.require(ctx.upstream.name().as_str())?;
        let runtime = finder::find(graph, upstream_idx, &*self.predicate)?;
        if runtime.is_absent() {
            tracing::info!(
                upstream = %ctx.upstream.name(),
                "no implicit runtime dependency; linker flags left untouched"
            );
        }

        let resolved = self.builder.build(&BuildInputs {
            compiler: &ctx.compiler,
            upstream: ctx.upstream,
            standard_variant: &self.config.standard_variant,
            cxx_standard,
            include_dir,
            runtime,
        })?;
        tracing::info!(
            component = %ctx.component.name(),
            upstream = %ctx.upstream.name(),
            arguments = resolved.arguments.len(),
            "build configuration resolved"
        );
        Ok(resolved)
    }

    fn context<'g>(
        &self,
        graph: &'g DependencyGraph,
        request: &ResolutionRequest,
    ) -> Result<Context<'g>> {
        let root = graph.require(request.component.as_str())?;
        let closure = graph.closure(root)?;
        let Some(&component) = closure.first() else {
            return Err(LinkwiseError::NotFound {
                kind: "component",
                id: request.component.to_string(),
            });
        };

        let compiler = request
            .compiler
            .clone()
            .unwrap_or_else(|| component.compiler().clone());
        compiler.validate()?;

        let upstream_name = request
            .upstream
            .as_ref()
            .map_or(self.config.upstream.as_str(), ComponentName::as_str);
        let upstream = closure
            .iter()
            .skip(1)
            .copied()
            .find(|c| c.name() == upstream_name)
            .ok_or_else(|| LinkwiseError::NotFound {
                kind: "upstream component",
                id: format!(
                    "\"{upstream_name}\" is not a dependency of \"{}\"",
                    request.component
                ),
            })?;
        tracing::debug!(
            component = %component.name(),
            upstream = %upstream.name(),
            family = %compiler.family,
            closure = closure.len(),
            "resolution context"
        );

        toolchain::check_declared(graph, root, &compiler.family, &request.conflicts)?;

        Ok(Context {
            graph,
            component,
            upstream,
            compiler,
        })
    }

    fn include_dir(
        &self,
        ctx: &Context<'_>,
        request: &ResolutionRequest,
    ) -> Result<Option<std::path::PathBuf>> {
        let provider = request
            .include_provider
            .as_ref()
            .map(ComponentName::as_str)
            .or(self.config.include_provider.as_deref());
        let Some(provider) = provider else {
            return Ok(None);
        };
        let root = ctx.graph.require(ctx.component.name().as_str())?;
        let found = ctx
            .graph
            .find_in_closure(root, provider)?
            .ok_or_else(|| LinkwiseError::NotFound {
                kind: "include provider",
                id: format!(
                    "\"{provider}\" is not a dependency of \"{}\"",
                    ctx.component.name()
                ),
            })?;
        let prefix = found.prefix().ok_or_else(|| LinkwiseError::Config {
            message: format!("include provider \"{provider}\" has no installation prefix"),
        })?;
        Ok(Some(prefix_join(prefix, &self.config.include_subdir)))
    }
}
