/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStage {
    BuildingProject,
    BuildingTopology,
    CreatingBuses,
    CreatingLines,
    CreatingCapacitors,
    CreatingLoads,
    CreatingTransformers,
    CreatingGenerators,
    ExportingInputs,
    Solving,
    ExportingResults,
    WritingBack,
    Saving,
    Completed,
}

#[derive(Debug, Clone)]
pub struct RunProgressEvent {
    pub stage: RunStage,
    pub elapsed_wall_s: f64,
    pub message: Option<String>,
}

impl RunProgressEvent {
    pub fn stage(stage: RunStage, elapsed_wall_s: f64, message: Option<String>) -> Self {
        Self {
            stage,
            elapsed_wall_s,
            message,
        }
    }
}
