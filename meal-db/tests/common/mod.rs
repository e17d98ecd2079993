#![allow(dead_code)]

use chrono::{DateTime, NaiveDate, Utc};
use meal_core::{Calendar, FixedClock, GovernmentId, MenuId, NewAllocation, SchoolId, TokenFormat};
use meal_db::{MealDatabase, MealServices, ReferenceData, ServiceSettings};
use std::sync::Arc;

pub const REFERENCE_JSON: &str = r#"{
  "governments": [
    { "id": "gov_1", "name": "Province One" },
    { "id": "gov_2", "name": "Province Two" }
  ],
  "schools": [
    { "id": "school_s", "government_id": "gov_1", "name": "SD Negeri 1" },
    { "id": "school_t", "government_id": "gov_1", "name": "SD Negeri 2" },
    { "id": "school_x", "government_id": "gov_2", "name": "SD Negeri 9" }
  ],
  "menus": [
    { "id": "menu_m", "government_id": "gov_1", "name": "Nasi Ayam",
      "description": "Rice with chicken", "serving_date": "2024-05-10", "price_per_portion": "15000.00" },
    { "id": "menu_n", "government_id": "gov_1", "name": "Soto",
      "serving_date": "2024-05-10", "price_per_portion": "12500.50" }
  ],
  "students": [
    { "id": "stu_a", "school_id": "school_s", "student_number": "1001", "name": "Ana", "class_name": "4A", "grade": "4" },
    { "id": "stu_b", "school_id": "school_s", "student_number": "1002", "name": "Bima", "class_name": "4A", "grade": "4" },
    { "id": "stu_c", "school_id": "school_s", "student_number": "1003", "name": "Citra", "class_name": "5B", "grade": "5" },
    { "id": "stu_d", "school_id": "school_s", "student_number": "1004", "name": "Dewi", "class_name": "5B", "grade": "5" },
    { "id": "stu_t1", "school_id": "school_t", "student_number": "1001", "name": "Tono", "class_name": "1A", "grade": "1" },
    { "id": "stu_t9", "school_id": "school_t", "student_number": "9009", "name": "Tini", "class_name": "1A", "grade": "1" }
  ]
}"#;

pub fn at(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

pub fn gov() -> GovernmentId {
    GovernmentId::new("gov_1")
}

pub fn school_s() -> SchoolId {
    SchoolId::new("school_s")
}

pub fn new_allocation(school: &str, menu: &str, quantity: i64, service_date: &str) -> NewAllocation {
    NewAllocation {
        school_id: SchoolId::new(school),
        menu_id: MenuId::new(menu),
        quantity,
        service_date: date(service_date),
    }
}

pub struct Harness {
    pub services: MealServices,
    pub clock: Arc<FixedClock>,
}

impl Harness {
    /// Fresh in-memory database, seeded, clock at `now`
    pub async fn in_memory(now: &str) -> Self {
        let database = MealDatabase::in_memory().unwrap();
        Self::seeded(database, now).await
    }

    /// Initialize and seed `database`
    pub async fn seeded(database: MealDatabase, now: &str) -> Self {
        database.init_schema().await.unwrap();
        let data: ReferenceData = serde_json::from_str(REFERENCE_JSON).unwrap();
        database.references.seed(data).await.unwrap();
        Self::attach(database, now)
    }

    /// Wire services over an already prepared database
    pub fn attach(database: MealDatabase, now: &str) -> Self {
        let clock = Arc::new(FixedClock::new(at(now)));
        let services = MealServices::new(
            Arc::new(database),
            ServiceSettings {
                token_format: TokenFormat::default(),
                calendar: Calendar::utc(),
                clock: clock.clone(),
            },
        );
        Self { services, clock }
    }
}
