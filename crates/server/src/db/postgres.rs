use async_trait::async_trait;
use deadpool_postgres::Pool;
use ehr_fhir_core::{
    ListId, ListRecord, ListType, PatientId, PatientRecord, PatientSearch, StoredList,
    StoredPatient, validation::is_date,
};
use tokio_postgres::Row;

use super::{ListService, PatientService, StoreError};

/// Dates at midnight render as FHIR `date`, anything else as `dateTime`
const LIST_COLUMNS: &str = "id, COALESCE(pid, 0), COALESCE(type, ''), COALESCE(title, ''), \
     COALESCE(to_char(begdate, CASE WHEN begdate::time = '00:00' \
         THEN 'YYYY-MM-DD' ELSE 'YYYY-MM-DD\"T\"HH24:MI:SS' END), ''), \
     COALESCE(to_char(enddate, CASE WHEN enddate::time = '00:00' \
         THEN 'YYYY-MM-DD' ELSE 'YYYY-MM-DD\"T\"HH24:MI:SS' END), ''), \
     COALESCE(diagnosis, '')";

const PATIENT_COLUMNS: &str = "pid, COALESCE(title, ''), COALESCE(fname, ''), \
     COALESCE(mname, ''), COALESCE(lname, ''), COALESCE(street, ''), \
     COALESCE(postal_code, ''), COALESCE(city, ''), COALESCE(state, ''), \
     COALESCE(country_code, ''), COALESCE(phone_contact, ''), \
     COALESCE(to_char(dob, 'YYYY-MM-DD'), ''), COALESCE(sex, ''), \
     COALESCE(race, ''), COALESCE(ethnicity, '')";

/// Record services backed by the EHR's `lists` and `patient_data` tables
#[derive(Clone)]
pub struct PgStore {
    pool: Pool,
}

impl PgStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

fn parse_pid(pid: &str) -> Result<i64, StoreError> {
    pid.parse()
        .map_err(|_| StoreError::InvalidRecord(format!("pid '{}' is not numeric", pid)))
}

fn list_from_row(row: &Row) -> Result<StoredList, StoreError> {
    let list_type: String = row.get(2);
    let list_type = list_type.parse().map_err(StoreError::InvalidRecord)?;
    let pid: i64 = row.get(1);

    Ok(StoredList {
        id: row.get(0),
        record: ListRecord {
            pid: pid.to_string(),
            list_type,
            title: row.get(3),
            begdate: row.get(4),
            enddate: row.get(5),
            diagnosis: row.get(6),
        },
    })
}

fn patient_from_row(row: &Row) -> StoredPatient {
    StoredPatient {
        pid: row.get(0),
        record: PatientRecord {
            title: row.get(1),
            fname: row.get(2),
            mname: row.get(3),
            lname: row.get(4),
            street: row.get(5),
            postal_code: row.get(6),
            city: row.get(7),
            state: row.get(8),
            country_code: row.get(9),
            phone_contact: row.get(10),
            dob: row.get(11),
            sex: row.get(12),
            race: row.get(13),
            ethnicity: row.get(14),
        },
    }
}

#[async_trait]
impl ListService for PgStore {
    async fn find_matching(&self, record: &ListRecord) -> Result<Vec<StoredList>, StoreError> {
        let client = self.pool.get().await?;
        let query = format!(
            "SELECT {} FROM lists \
             WHERE pid = $1 AND type = $2 AND title = $3 \
               AND begdate = $4::text::timestamp \
               AND enddate IS NOT DISTINCT FROM NULLIF($5::text, '')::timestamp \
             ORDER BY id",
            LIST_COLUMNS
        );
        let rows = client
            .query(
                &query,
                &[
                    &parse_pid(&record.pid)?,
                    &record.list_type.as_str(),
                    &record.title,
                    &record.begdate,
                    &record.enddate,
                ],
            )
            .await?;

        rows.iter().map(list_from_row).collect()
    }

    async fn insert(&self, record: &ListRecord) -> Result<Option<ListId>, StoreError> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                "INSERT INTO lists (date, pid, type, title, begdate, enddate, diagnosis, activity) \
                 VALUES (now(), $1, $2, $3, $4::text::timestamp, \
                         NULLIF($5::text, '')::timestamp, $6, 1) \
                 RETURNING id",
                &[
                    &parse_pid(&record.pid)?,
                    &record.list_type.as_str(),
                    &record.title,
                    &record.begdate,
                    &record.enddate,
                    &record.diagnosis,
                ],
            )
            .await?;

        Ok(row.map(|row| row.get(0)))
    }

    async fn update(&self, id: ListId, record: &ListRecord) -> Result<bool, StoreError> {
        let client = self.pool.get().await?;
        let updated = client
            .execute(
                "UPDATE lists SET pid = $2, title = $3, begdate = $4::text::timestamp, \
                     enddate = NULLIF($5::text, '')::timestamp, diagnosis = $6 \
                 WHERE id = $1 AND type = $7",
                &[
                    &id,
                    &parse_pid(&record.pid)?,
                    &record.title,
                    &record.begdate,
                    &record.enddate,
                    &record.diagnosis,
                    &record.list_type.as_str(),
                ],
            )
            .await?;

        Ok(updated > 0)
    }

    async fn get_one(
        &self,
        id: ListId,
        list_type: ListType,
    ) -> Result<Option<ListRecord>, StoreError> {
        let client = self.pool.get().await?;
        let query = format!("SELECT {} FROM lists WHERE id = $1 AND type = $2", LIST_COLUMNS);
        let row = client
            .query_opt(&query, &[&id, &list_type.as_str()])
            .await?;

        match row {
            Some(row) => Ok(Some(list_from_row(&row)?.record)),
            None => Ok(None),
        }
    }

    async fn get_all(
        &self,
        pid: Option<&str>,
        list_type: ListType,
    ) -> Result<Vec<StoredList>, StoreError> {
        let pid = match pid {
            Some(raw) => match raw.parse::<i64>() {
                Ok(pid) => Some(pid),
                Err(_) => return Ok(Vec::new()),
            },
            None => None,
        };
        let client = self.pool.get().await?;
        let query = format!(
            "SELECT {} FROM lists \
             WHERE type = $1 AND ($2::bigint IS NULL OR pid = $2) \
             ORDER BY id",
            LIST_COLUMNS
        );
        let rows = client.query(&query, &[&list_type.as_str(), &pid]).await?;

        rows.iter().map(list_from_row).collect()
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let client = self.pool.get().await?;
        client.query_one("SELECT 1", &[]).await?;
        Ok(())
    }
}

#[async_trait]
impl PatientService for PgStore {
    async fn insert(&self, record: &PatientRecord) -> Result<Option<PatientId>, StoreError> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                "INSERT INTO patient_data (pid, title, fname, mname, lname, street, postal_code, \
                     city, state, country_code, phone_contact, dob, sex, race, ethnicity) \
                 SELECT COALESCE(MAX(pid), 0) + 1, $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, \
                     NULLIF($11::text, '')::date, $12, $13, $14 \
                 FROM patient_data \
                 RETURNING pid",
                &[
                    &record.title,
                    &record.fname,
                    &record.mname,
                    &record.lname,
                    &record.street,
                    &record.postal_code,
                    &record.city,
                    &record.state,
                    &record.country_code,
                    &record.phone_contact,
                    &record.dob,
                    &record.sex,
                    &record.race,
                    &record.ethnicity,
                ],
            )
            .await?;

        Ok(row.map(|row| row.get(0)))
    }

    async fn update(&self, pid: PatientId, record: &PatientRecord) -> Result<bool, StoreError> {
        let client = self.pool.get().await?;
        let updated = client
            .execute(
                "UPDATE patient_data SET title = $2, fname = $3, mname = $4, lname = $5, \
                     street = $6, postal_code = $7, city = $8, state = $9, country_code = $10, \
                     phone_contact = $11, dob = NULLIF($12::text, '')::date, sex = $13, \
                     race = $14, ethnicity = $15 \
                 WHERE pid = $1",
                &[
                    &pid,
                    &record.title,
                    &record.fname,
                    &record.mname,
                    &record.lname,
                    &record.street,
                    &record.postal_code,
                    &record.city,
                    &record.state,
                    &record.country_code,
                    &record.phone_contact,
                    &record.dob,
                    &record.sex,
                    &record.race,
                    &record.ethnicity,
                ],
            )
            .await?;

        Ok(updated > 0)
    }

    async fn get_one(&self, pid: PatientId) -> Result<Option<PatientRecord>, StoreError> {
        let client = self.pool.get().await?;
        let query = format!("SELECT {} FROM patient_data WHERE pid = $1", PATIENT_COLUMNS);
        let row = client.query_opt(&query, &[&pid]).await?;

        Ok(row.map(|row| patient_from_row(&row).record))
    }

    async fn get_all(&self, search: &PatientSearch) -> Result<Vec<StoredPatient>, StoreError> {
        let name = search
            .name
            .as_deref()
            .filter(|name| !name.is_empty())
            .map(|name| format!("%{}%", name));
        let dob = search.dob.as_deref().filter(|dob| !dob.is_empty());
        if dob.is_some_and(|dob| !is_date(dob)) {
            return Ok(Vec::new());
        }

        let client = self.pool.get().await?;
        let query = format!(
            "SELECT {} FROM patient_data \
             WHERE ($1::text IS NULL OR fname ILIKE $1 OR mname ILIKE $1 OR lname ILIKE $1) \
               AND ($2::text IS NULL OR dob = $2::text::date) \
             ORDER BY pid",
            PATIENT_COLUMNS
        );
        let rows = client.query(&query, &[&name, &dob]).await?;

        Ok(rows.iter().map(patient_from_row).collect())
    }
}
