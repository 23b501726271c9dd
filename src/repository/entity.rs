//! Entity repository: places, persons and religions.

use std::collections::HashMap;

use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};

use super::models::{PersonRecord, PlaceAlternateNameRecord, PlaceRecord, ReligionRecord};
use super::pool::{AsyncSqlitePool, DieselError};
use crate::models::{EntityCatalog, Person, Place, Religion};
use crate::schema::{person, place, place_alternate_name, religion};

impl From<PersonRecord> for Person {
    fn from(record: PersonRecord) -> Self {
        Person {
            id: record.id,
            name: record.name,
            time_range: record.time_range,
        }
    }
}

impl From<ReligionRecord> for Religion {
    fn from(record: ReligionRecord) -> Self {
        Religion {
            id: record.id,
            name: record.name,
        }
    }
}

#[derive(Clone)]
pub struct EntityRepository {
    pool: AsyncSqlitePool,
}

impl EntityRepository {
    pub fn new(pool: AsyncSqlitePool) -> Self {
        Self { pool }
    }

    /// All places with their alternate names and transliterations.
    pub async fn list_places(&self) -> Result<Vec<Place>, DieselError> {
        let mut conn = self.pool.get().await?;

        let places: Vec<PlaceRecord> = place::table
            .select(PlaceRecord::as_select())
            .order(place::id.asc())
            .load(&mut conn)
            .await?;

        let alternates: Vec<PlaceAlternateNameRecord> = place_alternate_name::table
            .select(PlaceAlternateNameRecord::as_select())
            .order(place_alternate_name::id.asc())
            .load(&mut conn)
            .await?;

        let mut by_place: HashMap<i32, Vec<String>> = HashMap::new();
        for alt in alternates {
            by_place.entry(alt.place_id).or_default().push(alt.name);
        }

        Ok(places
            .into_iter()
            .map(|p| Place {
                alternate_names: by_place.remove(&p.id).unwrap_or_default(),
                id: p.id,
                name: p.name,
            })
            .collect())
    }

    pub async fn list_persons(&self) -> Result<Vec<Person>, DieselError> {
        let mut conn = self.pool.get().await?;

        person::table
            .select(PersonRecord::as_select())
            .order(person::id.asc())
            .load(&mut conn)
            .await
            .map(|records| records.into_iter().map(Person::from).collect())
    }

    pub async fn list_religions(&self) -> Result<Vec<Religion>, DieselError> {
        let mut conn = self.pool.get().await?;

        religion::table
            .select(ReligionRecord::as_select())
            .order(religion::id.asc())
            .load(&mut conn)
            .await
            .map(|records| records.into_iter().map(Religion::from).collect())
    }

    /// Load every entity into an in-memory catalog.
    pub async fn catalog(&self) -> Result<EntityCatalog, DieselError> {
        let places = self.list_places().await?;
        let persons = self.list_persons().await?;
        let religions = self.list_religions().await?;
        Ok(EntityCatalog::new(places, persons, religions))
    }

    /// Insert or update a place together with its alternate names.
    ///
    /// Updates in place so instances and annotations pointing at it survive.
    pub async fn save_place(&self, p: &Place) -> Result<(), DieselError> {
        let mut conn = self.pool.get().await?;
        let id = p.id;
        let name = p.name.clone();
        let alternates = p.alternate_names.clone();

        conn.transaction(|conn| {
            async move {
                diesel::insert_into(place::table)
                    .values((place::id.eq(id), place::name.eq(&name)))
                    .on_conflict(place::id)
                    .do_update()
                    .set(place::name.eq(&name))
                    .execute(conn)
                    .await?;

                diesel::delete(place_alternate_name::table.filter(place_alternate_name::place_id.eq(id)))
                    .execute(conn)
                    .await?;

                for alt in &alternates {
                    diesel::insert_into(place_alternate_name::table)
                        .values((
                            place_alternate_name::place_id.eq(id),
                            place_alternate_name::name.eq(alt),
                        ))
                        .execute(conn)
                        .await?;
                }

                Ok::<_, DieselError>(())
            }
            .scope_boxed()
        })
        .await
    }

    pub async fn save_person(&self, p: &Person) -> Result<(), DieselError> {
        let mut conn = self.pool.get().await?;

        diesel::insert_into(person::table)
            .values((
                person::id.eq(p.id),
                person::name.eq(&p.name),
                person::time_range.eq(&p.time_range),
            ))
            .on_conflict(person::id)
            .do_update()
            .set((
                person::name.eq(&p.name),
                person::time_range.eq(&p.time_range),
            ))
            .execute(&mut conn)
            .await?;

        Ok(())
    }

    pub async fn save_religion(&self, r: &Religion) -> Result<(), DieselError> {
        let mut conn = self.pool.get().await?;

        diesel::insert_into(religion::table)
            .values((religion::id.eq(r.id), religion::name.eq(&r.name)))
            .on_conflict(religion::id)
            .do_update()
            .set(religion::name.eq(&r.name))
            .execute(&mut conn)
            .await?;

        Ok(())
    }
}
