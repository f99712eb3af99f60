//! # carelink-seed
//!
//! A deterministic, entirely fictional village dataset for demos and manual
//! testing. Every id is a fixed `Uuid::from_u128` value and every timestamp
//! is pinned, so two runs produce byte-identical data and the demo's output
//! is reproducible. No real people, places, or medical records appear here.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use serde_json::{json, Map, Value};
use uuid::Uuid;

use carelink_contracts::assessment::{MentalAssessment, Severity};
use carelink_contracts::clinical::{DailyRecord, DoctorRecord, Vitals};
use carelink_contracts::form::{FieldKind, FormField};
use carelink_contracts::map::{GeoPoint, LocationKind, MapArea, MapLocation};
use carelink_contracts::medication::{
    Medication, MedicationIntake, MedicationRequest, RequestStatus,
};
use carelink_contracts::message::{Announcement, Message};
use carelink_contracts::profile::{PatientProfile, Pregnancy, VolunteerProfile};
use carelink_contracts::task::{Priority, Task, TaskKind, TaskStatus};
use carelink_contracts::user::{Role, User};
use carelink_store::Dataset;

// Fixed ids, one namespace byte per table so they stay readable in JSON dumps.
const DR_SOMCHAI: Uuid = Uuid::from_u128(0x0100_0001);
const DR_PREEYA: Uuid = Uuid::from_u128(0x0100_0002);
const VOL_NOK: Uuid = Uuid::from_u128(0x0100_0011);
const VOL_TAWAN: Uuid = Uuid::from_u128(0x0100_0012);
const PAT_MALI: Uuid = Uuid::from_u128(0x0100_0021);
const PAT_ANONG: Uuid = Uuid::from_u128(0x0100_0022);
const PAT_BOON: Uuid = Uuid::from_u128(0x0100_0023);

const PROFILE_NOK: Uuid = Uuid::from_u128(0x0200_0001);
const PROFILE_TAWAN: Uuid = Uuid::from_u128(0x0200_0002);
const PROFILE_MALI: Uuid = Uuid::from_u128(0x0300_0001);
const PROFILE_ANONG: Uuid = Uuid::from_u128(0x0300_0002);
const PROFILE_BOON: Uuid = Uuid::from_u128(0x0300_0003);

const AREA_NORTH: Uuid = Uuid::from_u128(0x0400_0001);
const AREA_RIVERSIDE: Uuid = Uuid::from_u128(0x0400_0002);

const MED_AMLODIPINE: Uuid = Uuid::from_u128(0x0500_0001);
const MED_METFORMIN: Uuid = Uuid::from_u128(0x0500_0002);

/// A fixed timestamp inside August 2026.
fn at(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 8, day, hour, minute, 0)
        .single()
        .unwrap_or_default()
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

fn hhmm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or_default()
}

fn point(lat: f64, lng: f64) -> GeoPoint {
    GeoPoint { lat, lng }
}

fn user(
    id: Uuid,
    role: Role,
    name: &str,
    email: &str,
    doctor_code: Option<&str>,
    created: DateTime<Utc>,
) -> User {
    User {
        id,
        role,
        name: name.to_string(),
        email: email.to_string(),
        password: "changeme".to_string(),
        photo_url: None,
        phone: None,
        date_of_birth: None,
        doctor_code: doctor_code.map(str::to_string),
        created_at: created,
        updated_at: created,
    }
}

/// Build the full village dataset.
///
/// Two doctors, two volunteers, three patients with full care-team
/// assignments, plus enough rows in every other table to exercise each part
/// of the portal. Display codes (`MRN-…`, `VHV-…`, `DOC-…`) are numbered
/// from 1, so sequence reconciliation continues from them.
pub fn village_dataset() -> Dataset {
    let mut data = Dataset::default();

    // ── Accounts ─────────────────────────────────────────────────────────────
    data.users = vec![
        user(
            DR_SOMCHAI,
            Role::Doctor,
            "Dr. Somchai Kittikorn",
            "somchai@banmai.example.org",
            Some("DOC-0001"),
            at(1, 8, 0),
        ),
        user(
            DR_PREEYA,
            Role::Doctor,
            "Dr. Preeya Wongsa",
            "preeya@banmai.example.org",
            Some("DOC-0002"),
            at(1, 8, 5),
        ),
        user(
            VOL_NOK,
            Role::Volunteer,
            "Nok Srisuwan",
            "nok@banmai.example.org",
            None,
            at(1, 9, 0),
        ),
        user(
            VOL_TAWAN,
            Role::Volunteer,
            "Tawan Chaiyo",
            "tawan@banmai.example.org",
            None,
            at(1, 9, 5),
        ),
        user(
            PAT_MALI,
            Role::Patient,
            "Mali Thongdee",
            "mali@banmai.example.org",
            None,
            at(2, 10, 0),
        ),
        user(
            PAT_ANONG,
            Role::Patient,
            "Anong Phumjai",
            "anong@banmai.example.org",
            None,
            at(2, 10, 10),
        ),
        user(
            PAT_BOON,
            Role::Patient,
            "Boonmee Raksa",
            "boonmee@banmai.example.org",
            None,
            at(2, 10, 20),
        ),
    ];

    // ── Map ──────────────────────────────────────────────────────────────────
    data.map_areas = vec![
        MapArea {
            id: AREA_NORTH,
            name: "North Village".to_string(),
            polygon: vec![
                point(18.810, 98.980),
                point(18.815, 98.980),
                point(18.815, 98.988),
                point(18.810, 98.988),
            ],
            color: Some("#4caf50".to_string()),
            created_at: at(1, 7, 0),
            updated_at: at(1, 7, 0),
        },
        MapArea {
            id: AREA_RIVERSIDE,
            name: "Riverside".to_string(),
            polygon: vec![
                point(18.800, 98.990),
                point(18.806, 98.990),
                point(18.806, 98.998),
                point(18.800, 98.998),
            ],
            color: Some("#2196f3".to_string()),
            created_at: at(1, 7, 0),
            updated_at: at(1, 7, 0),
        },
    ];
    data.map_locations = vec![
        MapLocation {
            id: Uuid::from_u128(0x0401_0001),
            name: "Ban Mai Health Post".to_string(),
            kind: LocationKind::HealthPost,
            point: point(18.812, 98.984),
            area_id: Some(AREA_NORTH),
            created_at: at(1, 7, 0),
            updated_at: at(1, 7, 0),
        },
        MapLocation {
            id: Uuid::from_u128(0x0401_0002),
            name: "District Clinic".to_string(),
            kind: LocationKind::Clinic,
            point: point(18.803, 98.993),
            area_id: Some(AREA_RIVERSIDE),
            created_at: at(1, 7, 0),
            updated_at: at(1, 7, 0),
        },
        MapLocation {
            id: Uuid::from_u128(0x0401_0003),
            name: "Riverside Pharmacy".to_string(),
            kind: LocationKind::Pharmacy,
            point: point(18.802, 98.996),
            area_id: Some(AREA_RIVERSIDE),
            created_at: at(1, 7, 0),
            updated_at: at(1, 7, 0),
        },
    ];

    // ── Profiles ─────────────────────────────────────────────────────────────
    data.volunteer_profiles = vec![
        VolunteerProfile {
            id: PROFILE_NOK,
            user_id: VOL_NOK,
            volunteer_code: "VHV-0001".to_string(),
            map_area_id: Some(AREA_NORTH),
            address: Some("12 Moo 3, North Village".to_string()),
            notes: None,
            created_at: at(1, 9, 0),
            updated_at: at(1, 9, 0),
        },
        VolunteerProfile {
            id: PROFILE_TAWAN,
            user_id: VOL_TAWAN,
            volunteer_code: "VHV-0002".to_string(),
            map_area_id: Some(AREA_RIVERSIDE),
            address: Some("45 Moo 1, Riverside".to_string()),
            notes: Some("covers riverside on weekday mornings".to_string()),
            created_at: at(1, 9, 5),
            updated_at: at(1, 9, 5),
        },
    ];

    let mali_daily_form = vec![
        FormField::required("breathlessness", "Any breathlessness today?", FieldKind::Checkbox),
        FormField::required(
            "appetite",
            "Appetite",
            FieldKind::Select {
                options: vec!["poor".to_string(), "normal".to_string(), "good".to_string()],
            },
        ),
        FormField::optional("weight_kg", "Morning weight (kg)", FieldKind::Number),
    ];

    data.patient_profiles = vec![
        PatientProfile {
            id: PROFILE_MALI,
            user_id: PAT_MALI,
            medical_record_number: "MRN-000001".to_string(),
            address: Some("8 Moo 3, North Village".to_string()),
            blood_type: Some("O+".to_string()),
            allergies: vec!["penicillin".to_string()],
            chronic_conditions: vec!["COPD".to_string(), "hypertension".to_string()],
            critical: true,
            elderly: true,
            pregnancy: None,
            assigned_doctor_id: Some(DR_SOMCHAI),
            assigned_volunteer_id: Some(VOL_NOK),
            map_area_id: Some(AREA_NORTH),
            home_location: Some(point(18.811, 98.982)),
            daily_form: mali_daily_form,
            created_at: at(2, 10, 0),
            updated_at: at(2, 10, 0),
        },
        PatientProfile {
            id: PROFILE_ANONG,
            user_id: PAT_ANONG,
            medical_record_number: "MRN-000002".to_string(),
            address: Some("22 Moo 1, Riverside".to_string()),
            blood_type: Some("B+".to_string()),
            allergies: Vec::new(),
            chronic_conditions: Vec::new(),
            critical: false,
            elderly: false,
            pregnancy: Some(Pregnancy {
                due_date: date(2026, 12, 18),
                gestational_week: 22,
            }),
            assigned_doctor_id: Some(DR_PREEYA),
            assigned_volunteer_id: Some(VOL_TAWAN),
            map_area_id: Some(AREA_RIVERSIDE),
            home_location: Some(point(18.804, 98.994)),
            daily_form: Vec::new(),
            created_at: at(2, 10, 10),
            updated_at: at(2, 10, 10),
        },
        PatientProfile {
            id: PROFILE_BOON,
            user_id: PAT_BOON,
            medical_record_number: "MRN-000003".to_string(),
            address: Some("3 Moo 2, North Village".to_string()),
            blood_type: None,
            allergies: Vec::new(),
            chronic_conditions: vec!["type 2 diabetes".to_string()],
            critical: false,
            elderly: true,
            pregnancy: None,
            assigned_doctor_id: Some(DR_SOMCHAI),
            assigned_volunteer_id: Some(VOL_NOK),
            map_area_id: Some(AREA_NORTH),
            home_location: None,
            daily_form: Vec::new(),
            created_at: at(2, 10, 20),
            updated_at: at(2, 10, 20),
        },
    ];

    // ── Tasks ────────────────────────────────────────────────────────────────
    data.tasks = vec![
        Task {
            id: Uuid::from_u128(0x0600_0001),
            kind: TaskKind::Appointment {
                patient_id: PROFILE_MALI,
                scheduled_at: at(26, 9, 30),
            },
            title: "Weekly blood-pressure check".to_string(),
            description: Some("Bring the cuff; log the reading in her record.".to_string()),
            status: TaskStatus::Pending,
            priority: Priority::High,
            assigned_to: VOL_NOK,
            assigned_by: DR_SOMCHAI,
            form_fields: Vec::new(),
            form_responses: None,
            report: None,
            completed_at: None,
            created_at: at(20, 8, 0),
            updated_at: at(20, 8, 0),
        },
        Task {
            id: Uuid::from_u128(0x0600_0002),
            kind: TaskKind::Appointment {
                patient_id: PROFILE_ANONG,
                scheduled_at: at(28, 14, 0),
            },
            title: "Antenatal home visit".to_string(),
            description: None,
            status: TaskStatus::Pending,
            priority: Priority::Medium,
            assigned_to: VOL_TAWAN,
            assigned_by: DR_PREEYA,
            form_fields: vec![
                FormField::required("fundal_height_cm", "Fundal height (cm)", FieldKind::Number),
                FormField::optional("notes", "Visit notes", FieldKind::Text),
            ],
            form_responses: None,
            report: None,
            completed_at: None,
            created_at: at(21, 9, 0),
            updated_at: at(21, 9, 0),
        },
        Task {
            id: Uuid::from_u128(0x0600_0003),
            kind: TaskKind::Todo,
            title: "Restock health post first-aid kits".to_string(),
            description: None,
            status: TaskStatus::Completed,
            priority: Priority::Low,
            assigned_to: VOL_NOK,
            assigned_by: DR_SOMCHAI,
            form_fields: Vec::new(),
            form_responses: None,
            report: Some("Restocked both kits; gauze is running low at the supplier.".to_string()),
            completed_at: Some(at(18, 16, 0)),
            created_at: at(15, 8, 0),
            updated_at: at(18, 16, 0),
        },
    ];

    // ── Messaging ────────────────────────────────────────────────────────────
    data.messages = vec![
        Message {
            id: Uuid::from_u128(0x0700_0001),
            sender_id: VOL_NOK,
            recipient_id: PAT_MALI,
            content: "Good morning! I will stop by tomorrow for your blood-pressure check."
                .to_string(),
            image_data: None,
            read: true,
            created_at: at(24, 8, 30),
            updated_at: at(24, 8, 45),
        },
        Message {
            id: Uuid::from_u128(0x0700_0002),
            sender_id: PAT_MALI,
            recipient_id: VOL_NOK,
            content: "Thank you Nok, I will be home all morning.".to_string(),
            image_data: None,
            read: false,
            created_at: at(24, 9, 0),
            updated_at: at(24, 9, 0),
        },
    ];
    data.announcements = vec![Announcement {
        id: Uuid::from_u128(0x0800_0001),
        author_id: DR_SOMCHAI,
        title: "Dengue season precautions".to_string(),
        content: "Empty standing water around your home and use nets at night. \
                  Report any fever lasting more than two days."
            .to_string(),
        priority: Priority::High,
        created_at: at(10, 7, 30),
        updated_at: at(10, 7, 30),
    }];

    // ── Clinical entries ─────────────────────────────────────────────────────
    let mut mali_responses = Map::new();
    mali_responses.insert("breathlessness".to_string(), Value::Bool(false));
    mali_responses.insert("appetite".to_string(), json!("normal"));
    mali_responses.insert("weight_kg".to_string(), json!(52.4));

    data.daily_records = vec![
        DailyRecord {
            id: Uuid::from_u128(0x0900_0001),
            patient_id: PROFILE_MALI,
            record_date: date(2026, 8, 23),
            vitals: Vitals {
                temperature: Some("98.6".to_string()),
                pulse: Some("78".to_string()),
                blood_pressure: Some("128/82".to_string()),
                blood_sugar: None,
                oxygen_saturation: Some("95".to_string()),
                pain_level: Some("2".to_string()),
                fatigue_level: Some("3".to_string()),
            },
            symptoms: None,
            notes: Some("Slept well.".to_string()),
            custom_responses: mali_responses,
            doctor_instructions: None,
            flags: Vec::new(),
            created_at: at(23, 7, 45),
            updated_at: at(23, 7, 45),
        },
        DailyRecord {
            id: Uuid::from_u128(0x0900_0002),
            patient_id: PROFILE_MALI,
            record_date: date(2026, 8, 24),
            vitals: Vitals {
                temperature: Some("101.2".to_string()),
                pulse: Some("96".to_string()),
                blood_pressure: Some("130/84".to_string()),
                blood_sugar: None,
                oxygen_saturation: Some("94".to_string()),
                pain_level: Some("4".to_string()),
                fatigue_level: Some("6".to_string()),
            },
            symptoms: Some("Headache since last night, feeling feverish.".to_string()),
            notes: None,
            custom_responses: Map::new(),
            doctor_instructions: Some("Paracetamol 500 mg, recheck temperature this evening."
                .to_string()),
            flags: vec!["temperature 101.2°F is high".to_string()],
            created_at: at(24, 8, 0),
            updated_at: at(24, 11, 30),
        },
    ];
    data.doctor_records = vec![DoctorRecord {
        id: Uuid::from_u128(0x0a00_0001),
        patient_id: PROFILE_MALI,
        doctor_id: DR_SOMCHAI,
        visit_date: date(2026, 8, 12),
        diagnosis: "COPD, stable; hypertension, controlled".to_string(),
        treatment: Some("Continue current inhaler and amlodipine.".to_string()),
        notes: Some("Encourage daily short walks.".to_string()),
        follow_up_date: Some(date(2026, 9, 12)),
        created_at: at(12, 11, 0),
        updated_at: at(12, 11, 0),
    }];

    // ── Medications ──────────────────────────────────────────────────────────
    data.medications = vec![
        Medication {
            id: MED_AMLODIPINE,
            patient_id: PROFILE_MALI,
            prescribed_by: DR_SOMCHAI,
            name: "Amlodipine".to_string(),
            dosage: "5 mg".to_string(),
            instructions: Some("Take with breakfast.".to_string()),
            schedule: vec![hhmm(8, 0)],
            start_date: date(2026, 8, 1),
            end_date: None,
            active: true,
            created_at: at(1, 12, 0),
            updated_at: at(1, 12, 0),
        },
        Medication {
            id: MED_METFORMIN,
            patient_id: PROFILE_BOON,
            prescribed_by: DR_SOMCHAI,
            name: "Metformin".to_string(),
            dosage: "850 mg".to_string(),
            instructions: Some("With morning and evening meals.".to_string()),
            schedule: vec![hhmm(8, 0), hhmm(19, 0)],
            start_date: date(2026, 8, 5),
            end_date: None,
            active: true,
            created_at: at(5, 12, 0),
            updated_at: at(5, 12, 0),
        },
    ];
    data.medication_intakes = vec![MedicationIntake {
        id: Uuid::from_u128(0x0b00_0001),
        medication_id: MED_AMLODIPINE,
        taken_at: at(24, 8, 10),
        schedule_slot: Some(hhmm(8, 0)),
        notes: None,
        created_at: at(24, 8, 10),
        updated_at: at(24, 8, 10),
    }];
    data.medication_requests = vec![MedicationRequest {
        id: Uuid::from_u128(0x0c00_0001),
        patient_id: PROFILE_ANONG,
        medication_name: "Iron supplement".to_string(),
        reason: Some("Midwife suggested it at the last antenatal visit.".to_string()),
        status: RequestStatus::Pending,
        reviewed_by: None,
        review_note: None,
        reviewed_at: None,
        fulfilled_at: None,
        created_at: at(22, 15, 0),
        updated_at: at(22, 15, 0),
    }];

    // ── Assessments ──────────────────────────────────────────────────────────
    data.mental_assessments = vec![MentalAssessment {
        id: Uuid::from_u128(0x0d00_0001),
        patient_id: PROFILE_MALI,
        answers: vec![1, 1, 2, 1, 0, 1, 0, 1, 0],
        total_score: 7,
        severity: Severity::Mild,
        created_at: at(17, 10, 0),
        updated_at: at(17, 10, 0),
    }];

    data
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use carelink_store::{MemoryBackend, RecordStore};

    use super::village_dataset;

    #[test]
    fn dataset_is_deterministic() {
        assert_eq!(village_dataset(), village_dataset());
        assert!(village_dataset().row_count() > 20);
    }

    #[test]
    fn seeded_store_joins_resolve_and_sequences_continue() {
        let (store, report) = RecordStore::open(MemoryBackend::new(), village_dataset()).unwrap();
        assert!(report.is_clean());

        let patients = store.list_patients();
        assert_eq!(patients.len(), 3);
        assert!(patients.iter().all(|p| p.user.is_some()));
        assert!(patients.iter().all(|p| p.assigned_doctor.is_some()));

        // Sequence marks cover the seeded codes.
        let boonmee = patients
            .iter()
            .find(|p| p.profile.medical_record_number == "MRN-000003")
            .unwrap();
        let next = store
            .create_patient(carelink_contracts::profile::NewPatientProfile {
                user_id: boonmee.profile.user_id,
                medical_record_number: None,
                address: None,
                blood_type: None,
                allergies: Vec::new(),
                chronic_conditions: Vec::new(),
                critical: false,
                elderly: false,
                pregnancy: None,
                assigned_doctor_id: None,
                assigned_volunteer_id: None,
                map_area_id: None,
                home_location: None,
                daily_form: Vec::new(),
            })
            .unwrap();
        assert_eq!(next.medical_record_number, "MRN-000004");
    }
}
