//! JSON scenario files consumed by the command-line tools.

use serde::{Deserialize, Serialize};

use crate::agents::{AgentRecord, RegionId};
use crate::grid::Grid;
use crate::region::RegionInputs;

/// On-disk form of [`RegionInputs`]. `regions` and `study_area` may be left
/// out: the whole grid is then one region (id 0) and lies inside the study
/// area.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub cultivable: Grid<bool>,
    #[serde(default)]
    pub regions: Option<Grid<RegionId>>,
    #[serde(default)]
    pub study_area: Option<Grid<bool>>,
    pub agents: Vec<AgentRecord>,
}

impl Scenario {
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    pub fn into_inputs(self) -> RegionInputs {
        let (w, h) = (self.cultivable.width, self.cultivable.height);
        RegionInputs {
            regions: self.regions.unwrap_or_else(|| Grid::new(w, h, 0)),
            study_area: self.study_area.unwrap_or_else(|| Grid::new(w, h, true)),
            cultivable: self.cultivable,
            agents: self.agents,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_grids_default_to_whole_extent() {
        let text = r#"{
            "cultivable": {"width": 2, "height": 1, "data": [true, false]},
            "agents": [{"id": 0, "size": 1}]
        }"#;
        let inputs = Scenario::from_json(text).unwrap().into_inputs();
        assert_eq!(inputs.regions.data, vec![0, 0]);
        assert_eq!(inputs.study_area.data, vec![true, true]);
        assert_eq!(inputs.agents[0].region, 0);
    }

    #[test]
    fn grids_with_wrong_cell_count_do_not_parse() {
        let text = r#"{
            "cultivable": {"width": 3, "height": 2, "data": [true, true, true, true]},
            "agents": [{"id": 0, "size": 4}]
        }"#;
        let err = Scenario::from_json(text).unwrap_err();
        assert!(err.is_data(), "expected a data error, got {err}");
        assert!(err.to_string().contains("expected 3x2"), "unexpected error: {err}");
    }
}
