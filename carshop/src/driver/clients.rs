// CarShop
// Copyright 2023 Julio Merino
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not
// use this file except in compliance with the License.  You may obtain a copy
// of the License at:
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.  See the
// License for the specific language governing permissions and limitations
// under the License.

//! Operations on the clients of the dealership.

use crate::db;
use crate::driver::{Driver, not_found};
use crate::model::*;
use carshop_core::db::DbError;
use carshop_core::driver::{DriverError, DriverResult};

/// Converts a database error raised while writing the client with `cpf` into a driver error.
fn cpf_conflict(e: DbError, cpf: &Cpf) -> DriverError {
    match e {
        DbError::AlreadyExists => {
            DriverError::AlreadyExists(format!("CPF {} is already registered", cpf.as_str()))
        }
        e => e.into(),
    }
}

impl Driver {
    /// Parses `birth_date` and validates it against the current date.
    fn birth_date(&self, birth_date: &str) -> DriverResult<BirthDate> {
        Ok(BirthDate::parse(birth_date, self.clock.today_utc())?)
    }

    /// Registers a new client.
    pub(crate) async fn create_client(
        self,
        name: ClientName,
        cpf: Cpf,
        birth_date: &str,
    ) -> DriverResult<Client> {
        let birth_date = self.birth_date(birth_date)?;
        let client = NewClient { name, cpf: cpf.clone(), birth_date };

        let mut tx = self.db.begin().await?;
        let client = db::create_client(tx.ex(), client).await.map_err(|e| cpf_conflict(e, &cpf))?;
        tx.commit().await?;
        Ok(client)
    }

    /// Gets the client identified by `id`.
    pub(crate) async fn get_client(self, id: ClientId) -> DriverResult<Client> {
        let mut tx = self.db.begin().await?;
        let client = db::get_client(tx.ex(), id).await.map_err(|e| not_found(e, "Client", id))?;
        tx.commit().await?;
        Ok(client)
    }

    /// Gets all clients that match `filter`, sorted by name.
    pub(crate) async fn list_clients(self, filter: ClientFilter) -> DriverResult<Vec<Client>> {
        let mut tx = self.db.begin().await?;
        let clients = db::list_clients(tx.ex(), &filter).await?;
        tx.commit().await?;
        Ok(clients)
    }

    /// Modifies the fields of the client identified by `id` that are present.
    ///
    /// `birth_date` is given in textual form because it is validated against the current date.
    pub(crate) async fn update_client(
        self,
        id: ClientId,
        name: Option<ClientName>,
        cpf: Option<Cpf>,
        birth_date: Option<&str>,
    ) -> DriverResult<Client> {
        let birth_date = match birth_date {
            Some(birth_date) => Some(self.birth_date(birth_date)?),
            None => None,
        };
        let update = ClientUpdate { name, cpf, birth_date };

        let mut tx = self.db.begin().await?;
        let (_, client) = db::get_client(tx.ex(), id)
            .await
            .map_err(|e| not_found(e, "Client", id))?
            .into_parts();

        let client = client.apply(update);
        db::update_client(tx.ex(), id, &client).await.map_err(|e| cpf_conflict(e, &client.cpf))?;

        tx.commit().await?;
        Ok(Client::new(id, client))
    }

    /// Deletes the client identified by `id`.
    pub(crate) async fn delete_client(self, id: ClientId) -> DriverResult<()> {
        let mut tx = self.db.begin().await?;
        db::delete_client(tx.ex(), id).await.map_err(|e| not_found(e, "Client", id))?;
        tx.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::testutils::*;
    use time::macros::{date, datetime};

    #[tokio::test]
    async fn test_create_client_ok() {
        let context = TestContext::setup().await;

        let client = context
            .driver()
            .create_client(ClientName::from("Maria Silva"), Cpf::from("123.456.789-09"), "1985-03-02")
            .await
            .unwrap();
        assert_eq!("12345678909", client.cpf().as_str());
        assert_eq!(date!(1985 - 03 - 02), client.birth_date().as_date());

        assert_eq!(client, db::get_client(&mut context.ex().await, *client.id()).await.unwrap());
    }

    #[tokio::test]
    async fn test_create_client_duplicate_cpf() {
        let context = TestContext::setup().await;
        context.create_client("Maria", "12345678909").await;

        assert_eq!(
            DriverError::AlreadyExists("CPF 12345678909 is already registered".to_owned()),
            context
                .driver()
                .create_client(ClientName::from("Joana"), Cpf::from("12345678909"), "1990-01-01")
                .await
                .unwrap_err()
        );
    }

    #[tokio::test]
    async fn test_create_client_birth_date_uses_clock() {
        let context = TestContext::setup().await;

        assert_eq!(
            DriverError::InvalidInput("Birth date cannot be in the future".to_owned()),
            context
                .driver()
                .create_client(ClientName::from("Baby"), Cpf::from("11111111111"), "2024-06-16")
                .await
                .unwrap_err()
        );

        context.clock().set(datetime!(2024-06-16 00:00:00 UTC));
        context
            .driver()
            .create_client(ClientName::from("Baby"), Cpf::from("11111111111"), "2024-06-16")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_create_client_bad_birth_date() {
        let context = TestContext::setup().await;

        for (date, msg) in [
            ("1899-12-31", "before 1900-01-01"),
            ("31/12/1990", "not a valid YYYY-MM-DD date"),
            ("1990-02-30", "not a valid YYYY-MM-DD date"),
        ] {
            match context
                .driver()
                .create_client(ClientName::from("X"), Cpf::from("11111111111"), date)
                .await
            {
                Err(DriverError::InvalidInput(e)) => assert!(e.contains(msg), "{}", e),
                e => panic!("{:?}", e),
            }
        }
    }

    #[tokio::test]
    async fn test_get_client_not_found() {
        let context = TestContext::setup().await;

        assert_eq!(
            DriverError::NotFound("Client 7 not found".to_owned()),
            context.driver().get_client(ClientId::new(7)).await.unwrap_err()
        );
    }

    #[tokio::test]
    async fn test_list_clients_filters() {
        let context = TestContext::setup().await;
        let maria = context.create_client("Maria Souza", "12345678909").await;
        let mario = context.create_client("Mario Souza", "98765432100").await;
        context.create_client("Pedro Lima", "12399999999").await;

        let filter = ClientFilter::new(Some("souza".to_owned()), None).unwrap();
        assert_eq!(vec![maria.clone(), mario], context.driver().list_clients(filter).await.unwrap());

        let filter = ClientFilter::new(Some("souza".to_owned()), Some("123".to_owned())).unwrap();
        assert_eq!(vec![maria], context.driver().list_clients(filter).await.unwrap());
    }

    #[tokio::test]
    async fn test_update_client_partial() {
        let context = TestContext::setup().await;
        let client = context.create_client("Maria", "12345678909").await;

        let updated = context
            .driver()
            .update_client(*client.id(), None, None, Some("1991-07-04"))
            .await
            .unwrap();

        assert_eq!("Maria", updated.name().as_str());
        assert_eq!("12345678909", updated.cpf().as_str());
        assert_eq!(date!(1991 - 07 - 04), updated.birth_date().as_date());
        assert_eq!(updated, db::get_client(&mut context.ex().await, *client.id()).await.unwrap());
    }

    #[tokio::test]
    async fn test_update_client_duplicate_cpf() {
        let context = TestContext::setup().await;
        context.create_client("Maria", "12345678909").await;
        let joana = context.create_client("Joana", "98765432100").await;

        assert_eq!(
            DriverError::AlreadyExists("CPF 12345678909 is already registered".to_owned()),
            context
                .driver()
                .update_client(*joana.id(), None, Some(Cpf::from("12345678909")), None)
                .await
                .unwrap_err()
        );
    }

    #[tokio::test]
    async fn test_update_client_not_found() {
        let context = TestContext::setup().await;

        assert_eq!(
            DriverError::NotFound("Client 4 not found".to_owned()),
            context.driver().update_client(ClientId::new(4), None, None, None).await.unwrap_err()
        );
    }

    #[tokio::test]
    async fn test_delete_client() {
        let context = TestContext::setup().await;
        let client = context.create_client("Maria", "12345678909").await;

        context.driver().delete_client(*client.id()).await.unwrap();

        assert!(context.driver().list_clients(ClientFilter::default()).await.unwrap().is_empty());
        assert_eq!(
            DriverError::NotFound(format!("Client {} not found", client.id())),
            context.driver().delete_client(*client.id()).await.unwrap_err()
        );
    }
}
