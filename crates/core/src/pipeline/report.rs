use serde::Serialize;

use crate::clustering::result_ranker::RankedPerson;
use crate::shared::timecode::format_timecode;

/// Final analysis output, serialized as-is to JSON.
#[derive(Clone, Debug, Serialize)]
pub struct AnalysisReport {
    pub total_people: usize,
    pub faces: Vec<PersonEntry>,
}

/// One discovered person: where their representative image was saved and
/// every time they appeared.
#[derive(Clone, Debug, Serialize)]
pub struct PersonEntry {
    /// Image filename relative to the faces directory, e.g. `person_1.jpg`.
    pub image: String,
    /// Appearance times as `H:MM:SS`, ascending.
    pub timestamps: Vec<String>,
}

impl AnalysisReport {
    /// Builds the report from ranked people. Image filenames follow the
    /// 1-based rank ids the ranker assigned.
    pub fn from_ranked(people: &[RankedPerson]) -> Self {
        let faces = people
            .iter()
            .map(|person| PersonEntry {
                image: image_filename(person.id),
                timestamps: person.timestamps.iter().map(|&t| format_timecode(t)).collect(),
            })
            .collect::<Vec<_>>();
        Self {
            total_people: faces.len(),
            faces,
        }
    }
}

pub fn image_filename(person_id: u32) -> String {
    format!("person_{person_id}.jpg")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::frame::Frame;

    fn person(id: u32, timestamps: Vec<u64>) -> RankedPerson {
        RankedPerson {
            id,
            quality: 0.5,
            timestamps,
            representative: Frame::new(vec![0; 16 * 16 * 3], 16, 16, 3, 0),
        }
    }

    #[test]
    fn test_report_counts_people() {
        let report = AnalysisReport::from_ranked(&[person(1, vec![0]), person(2, vec![5])]);
        assert_eq!(report.total_people, 2);
        assert_eq!(report.faces.len(), 2);
    }

    #[test]
    fn test_image_names_follow_rank_ids() {
        let report = AnalysisReport::from_ranked(&[person(1, vec![0]), person(2, vec![5])]);
        assert_eq!(report.faces[0].image, "person_1.jpg");
        assert_eq!(report.faces[1].image, "person_2.jpg");
    }

    #[test]
    fn test_timestamps_formatted_as_timecodes() {
        let report = AnalysisReport::from_ranked(&[person(1, vec![0, 75, 3725])]);
        assert_eq!(
            report.faces[0].timestamps,
            vec!["0:00:00", "0:01:15", "1:02:05"]
        );
    }

    #[test]
    fn test_empty_input_serializes_to_empty_report() {
        let report = AnalysisReport::from_ranked(&[]);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["total_people"], 0);
        assert!(json["faces"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_json_shape() {
        let report = AnalysisReport::from_ranked(&[person(1, vec![12])]);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["total_people"], 1);
        assert_eq!(json["faces"][0]["image"], "person_1.jpg");
        assert_eq!(json["faces"][0]["timestamps"][0], "0:00:12");
        // No other keys leak into the entries
        assert_eq!(json["faces"][0].as_object().unwrap().len(), 2);
    }
}
