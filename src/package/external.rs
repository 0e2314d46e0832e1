use std::path::Path;
use std::sync::Arc;

use super::{AssemblyPlan, AssemblyStrategy, StrategyKind};
use crate::core::ModelpackError;
use crate::tools::{ToolCommand, ToolLocator};

/// Builds the package with the Windows SDK `makeappx` tool
///
/// Runs `makeappx pack /d <source> /p <output> /o /nv` and waits for it. Success is
/// decided by the exit code alone.
pub struct ExternalToolStrategy {
    locator: Arc<dyn ToolLocator>,
}

impl ExternalToolStrategy {
    /// Strategy that finds makeappx through `locator`
    pub fn new(locator: Arc<dyn ToolLocator>) -> Self {
        Self {
            locator,
        }
    }

    fn command(tool: &Path, plan: &AssemblyPlan, output: &Path) -> ToolCommand {
        ToolCommand::new(tool)
            .arg("pack")
            .arg("/d")
            .path_arg(&plan.source_folder)
            .arg("/p")
            .path_arg(output)
            .arg("/o")
            .arg("/nv")
    }
}

impl AssemblyStrategy for ExternalToolStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::ExternalTool
    }

    fn try_assemble(&self, plan: &AssemblyPlan, output: &Path) -> Result<(), ModelpackError> {
        let failed = |reason: String| ModelpackError::StrategyFailed {
            strategy: StrategyKind::ExternalTool.to_string(),
            reason,
        };

        let tool = self.locator.find_assembly_tool().ok_or_else(|| {
            failed(
                ModelpackError::ToolNotFound {
                    tool: "makeappx".to_string(),
                }
                .to_string(),
            )
        })?;

        let result = Self::command(&tool, plan, output)
            .run_blocking()
            .map_err(|e| failed(e.to_string()))?;

        if result.success {
            Ok(())
        } else {
            Err(failed(format!("makeappx {}", result.failure_reason())))
        }
    }
}
