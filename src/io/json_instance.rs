use serde::{Deserialize, Serialize};

use crate::geometry::Pose;
use crate::solution::{DockSolution, SolveStatus};

/// The JSON representation of a docking instance
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct JsonInstance {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Shapes in docking order, the first one stays anchored at the origin
    pub shapes: Vec<JsonShape>,
}

/// The different ways a shape can be given
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JsonShape {
    /// Simple polygon given by its vertices in order, either orientation
    Polygon {
        vertices: Vec<(f64, f64)>,
        #[serde(default)]
        landmarks: Vec<JsonLandmark>,
    },
    /// Circle, approximated by a regular polygon with `segments` vertices
    Circle {
        center: (f64, f64),
        radius: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        segments: Option<usize>,
        #[serde(default)]
        landmarks: Vec<JsonLandmark>,
    },
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct JsonLandmark {
    pub color: String,
    pub position: (f64, f64),
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct JsonPose {
    pub x: f64,
    pub y: f64,
    pub theta: f64,
}

/// The JSON representation of a solution
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct JsonSolution {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub poses: Vec<JsonPose>,
    pub cost: f64,
    pub overlap: f64,
    pub cross_overlap: f64,
    pub feasible: bool,
    pub violation: f64,
    pub n_evaluations: usize,
    pub run_time_sec: f64,
}

impl From<&Pose> for JsonPose {
    fn from(pose: &Pose) -> Self {
        JsonPose {
            x: pose.x,
            y: pose.y,
            theta: pose.theta,
        }
    }
}

impl From<JsonPose> for Pose {
    fn from(pose: JsonPose) -> Self {
        Pose::new(pose.x, pose.y, pose.theta)
    }
}

impl JsonSolution {
    pub fn new(solution: &DockSolution, name: Option<String>) -> Self {
        let violation = match solution.status {
            SolveStatus::Feasible => 0.0,
            SolveStatus::OptimizationFailure { violation } => violation,
        };
        JsonSolution {
            name,
            poses: solution.configuration.iter().map(JsonPose::from).collect(),
            cost: solution.cost,
            overlap: solution.overlap,
            cross_overlap: solution.cross_overlap,
            feasible: solution.is_feasible(),
            violation,
            n_evaluations: solution.n_evaluations,
            run_time_sec: solution.elapsed.as_secs_f64(),
        }
    }

    pub fn configuration(&self) -> Vec<Pose> {
        self.poses.iter().map(|&p| Pose::from(p)).collect()
    }
}
