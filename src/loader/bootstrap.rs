//! Sequential Module Bootstrapper
//!
//! Turns resolved descriptors into live module instances, strictly one at a
//! time: module N+1's code is not requested before module N's scripts,
//! styles and translations have settled. Later modules may rely on shared
//! scripts loaded by earlier ones, and the page layout stays deterministic.

use super::file::FileLoader;
use super::orchestrator::OrchestratorOptions;
use super::registry::LoadedFileRegistry;
use crate::host::HostShell;
use crate::modules::{
    merge_config, DashboardModule, ModuleContext, ModuleDescriptor, ModuleInstance, ModuleState,
};

#[derive(Debug, Clone, Copy)]
enum Hook {
    Scripts,
    Styles,
    Translations,
}

impl Hook {
    const ALL: [Hook; 3] = [Hook::Scripts, Hook::Styles, Hook::Translations];

    fn label(self) -> &'static str {
        match self {
            Hook::Scripts => "Scripts",
            Hook::Styles => "Styles",
            Hook::Translations => "Translations",
        }
    }
}

/// Loads and instantiates modules in order
pub struct Bootstrapper<'a> {
    shell: &'a dyn HostShell,
    loader: &'a FileLoader,
    files: &'a mut LoadedFileRegistry,
    options: &'a OrchestratorOptions,
}

impl<'a> Bootstrapper<'a> {
    pub fn new(
        shell: &'a dyn HostShell,
        loader: &'a FileLoader,
        files: &'a mut LoadedFileRegistry,
        options: &'a OrchestratorOptions,
    ) -> Self {
        Self {
            shell,
            loader,
            files,
            options,
        }
    }

    /// Bootstrap every descriptor in order
    ///
    /// Returns the instances that were created. Unknown modules are left
    /// out; cancellation stops processing of the remaining descriptors.
    pub async fn load_modules(&mut self, descriptors: Vec<ModuleDescriptor>) -> Vec<ModuleInstance> {
        let total = descriptors.len();
        let mut instances = Vec::with_capacity(total);

        for (attempted, descriptor) in descriptors.into_iter().enumerate() {
            if self.loader.cancel_token().is_cancelled() {
                tracing::warn!(
                    "Bootstrap cancelled, {} of {} modules not loaded",
                    total - attempted,
                    total
                );
                break;
            }

            if let Some(instance) = self.load_module(descriptor).await {
                instances.push(instance);
            }
        }

        instances
    }

    /// Load a module's code (once per URL) and bootstrap a new instance
    pub async fn load_module(&mut self, descriptor: ModuleDescriptor) -> Option<ModuleInstance> {
        let url = descriptor.url();
        let mut stages = vec![ModuleState::Resolved];

        if self.files.has_module_file(&url) {
            tracing::debug!("Module code already loaded: {}", url);
        } else {
            self.loader.load_file(&url).await;
            self.files.record_module_file(&url);
        }
        stages.push(ModuleState::CodeLoaded);

        let module = match self.shell.create_module(&descriptor.name) {
            Some(module) => module,
            None => {
                tracing::debug!("No module registered as {}, skipping", descriptor.name);
                return None;
            }
        };

        self.bootstrap_module(descriptor, module, &stages).await
    }

    async fn bootstrap_module(
        &mut self,
        descriptor: ModuleDescriptor,
        module: Box<dyn DashboardModule>,
        earlier: &[ModuleState],
    ) -> Option<ModuleInstance> {
        tracing::info!("Bootstrapping module: {}", descriptor.name);

        let mut instance = ModuleInstance::new(descriptor, module).with_earlier_stages(earlier);
        let timeout = self.options.hook_timeout;
        let cancel = self.loader.cancel_token().clone();
        let mut cancelled = false;

        {
            let (descriptor, module) = instance.parts_mut();
            module.set_descriptor(descriptor);
            let config = merge_config(&module.defaults(), &descriptor.config, descriptor.merge_strategy);
            module.set_config(config);
        }
        instance.set_state(ModuleState::ConfigMerged);

        {
            let (descriptor, module) = instance.parts_mut();
            let mut ctx = ModuleContext::new(
                self.loader,
                &mut *self.files,
                &self.options.vendor,
                descriptor,
                &self.options.language,
                &self.options.root_dir,
            );

            for hook in Hook::ALL {
                let pending = match hook {
                    Hook::Scripts => module.load_scripts(&mut ctx),
                    Hook::Styles => module.load_styles(&mut ctx),
                    Hook::Translations => module.load_translations(&mut ctx),
                };

                let result = tokio::select! {
                    _ = cancel.cancelled() => {
                        cancelled = true;
                        break;
                    }
                    res = tokio::time::timeout(timeout, pending) => res,
                };

                match result {
                    Ok(Ok(())) => {
                        tracing::debug!("{} loaded for: {}", hook.label(), descriptor.name)
                    }
                    Ok(Err(e)) => tracing::warn!(
                        "{} failed for {}: {}",
                        hook.label(),
                        descriptor.name,
                        e
                    ),
                    Err(_) => tracing::warn!(
                        "{} for {} timed out after {:?}",
                        hook.label(),
                        descriptor.name,
                        timeout
                    ),
                }
            }
        }

        if cancelled {
            tracing::warn!("Bootstrap of {} cancelled", instance.name());
            return None;
        }

        instance.set_state(ModuleState::ResourcesLoaded);
        Some(instance)
    }
}
