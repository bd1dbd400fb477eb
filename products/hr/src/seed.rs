//! Reference data for a fresh database. Rows that already exist are left
//! alone, so seeding twice is harmless.

use entity::{countries, jobs, locations};
use sea_orm::{ActiveValue::Set, ConnectionTrait, DbErr, EntityTrait, sea_query::OnConflict};
use tracing::info;

const COUNTRIES: &[(&str, &str, &str)] = &[
    ("US", "United States of America", "Americas"),
    ("CA", "Canada", "Americas"),
    ("UK", "United Kingdom", "Europe"),
    ("DE", "Germany", "Europe"),
];

const LOCATIONS: &[(i32, &str, &str, &str, Option<&str>, &str)] = &[
    (1700, "2004 Charade Rd", "98199", "Seattle", Some("Washington"), "US"),
    (1800, "147 Spadina Ave", "M5V 2L7", "Toronto", Some("Ontario"), "CA"),
    (2400, "8204 Arthur St", "", "London", None, "UK"),
    (2700, "Schwanthalerstr. 7031", "80925", "Munich", Some("Bavaria"), "DE"),
];

const JOBS: &[(&str, &str, f64, f64)] = &[
    ("AD_PRES", "President", 20080.0, 40000.0),
    ("AD_VP", "Administration Vice President", 15000.0, 30000.0),
    ("AD_ASST", "Administration Assistant", 3000.0, 6000.0),
    ("FI_MGR", "Finance Manager", 8200.0, 16000.0),
    ("IT_PROG", "Programmer", 4000.0, 10000.0),
    ("SA_REP", "Sales Representative", 6000.0, 12008.0),
    ("ST_CLERK", "Stock Clerk", 2008.0, 5000.0),
];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub countries: u64,
    pub locations: u64,
    pub jobs: u64,
}

pub async fn reference_data<C: ConnectionTrait>(conn: &C) -> Result<SeedReport, DbErr> {
    let countries = countries::Entity::insert_many(COUNTRIES.iter().map(|(id, name, region)| {
        countries::ActiveModel {
            country_id: Set(id.to_string()),
            country_name: Set(name.to_string()),
            region_name: Set(Some(region.to_string())),
        }
    }))
    .on_conflict(
        OnConflict::column(countries::Column::CountryId)
            .do_nothing()
            .to_owned(),
    )
    .exec_without_returning(conn)
    .await?;

    let locations = locations::Entity::insert_many(LOCATIONS.iter().map(
        |(id, street, postal, city, state, country)| locations::ActiveModel {
            location_id: Set(*id),
            street_address: Set(Some(street.to_string())),
            postal_code: Set(Some(postal.to_string()).filter(|code| !code.is_empty())),
            city: Set(city.to_string()),
            state_province: Set(state.map(str::to_string)),
            country_id: Set(Some(country.to_string())),
        },
    ))
    .on_conflict(
        OnConflict::column(locations::Column::LocationId)
            .do_nothing()
            .to_owned(),
    )
    .exec_without_returning(conn)
    .await?;

    let jobs = jobs::Entity::insert_many(JOBS.iter().map(|(id, title, min, max)| {
        jobs::ActiveModel {
            job_id: Set(id.to_string()),
            job_title: Set(title.to_string()),
            min_salary: Set(Some(*min)),
            max_salary: Set(Some(*max)),
        }
    }))
    .on_conflict(OnConflict::column(jobs::Column::JobId).do_nothing().to_owned())
    .exec_without_returning(conn)
    .await?;

    let report = SeedReport {
        countries,
        locations,
        jobs,
    };
    info!(?report, "reference data seeded");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;
    use sea_orm::PaginatorTrait;

    #[tokio::test]
    async fn seeding_twice_inserts_once() {
        let db = testing::migrated().await;

        let first = reference_data(&db).await.unwrap();
        assert_eq!(first.jobs, JOBS.len() as u64);
        let second = reference_data(&db).await.unwrap();
        assert_eq!(second, SeedReport::default());
        assert_eq!(
            locations::Entity::find().count(&db).await.unwrap(),
            LOCATIONS.len() as u64
        );
    }
}
