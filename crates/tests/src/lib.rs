//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 合约快照测试
//! - gateway + 内存 transport 的端到端场景
//! - 搜索管道经由 gateway 的端到端场景
//! - 针对假 HTTP 服务器的完整往返

#[cfg(test)]
mod contract_tests {
    use contracts::{HeroRecord, HeroRef, HeroesConfig, SupersedePolicy};

    #[test]
    fn test_hero_record_wire_shape() {
        let hero = HeroRecord::new(7, "Ozzy");
        let json = serde_json::to_value(&hero).unwrap();
        assert_eq!(json, serde_json::json!({ "id": 7, "name": "Ozzy" }));
    }

    #[test]
    fn test_hero_ref_resolves_to_id() {
        let record = HeroRecord::new(7, "Ozzy");
        assert_eq!(HeroRef::from(7).id(), HeroRef::from(&record).id());
    }

    #[test]
    fn test_default_config_loads_through_loader() {
        let toml = config_loader::ConfigLoader::to_toml(&HeroesConfig::default()).unwrap();
        let config =
            config_loader::ConfigLoader::load_from_str(&toml, config_loader::ConfigFormat::Toml)
                .unwrap();
        assert_eq!(config.search.supersede, SupersedePolicy::OnInput);
    }
}

#[cfg(test)]
mod gateway_e2e {
    use std::sync::Arc;

    use contracts::{HeroRecord, NewHero};
    use gateway::{GatewayOp, HeroGateway, MessageLog};
    use transport::{InMemoryConfig, InMemoryHeroTransport, TransportOp};

    fn setup(config: InMemoryConfig) -> (HeroGateway<InMemoryHeroTransport>, Arc<MessageLog>) {
        let log = Arc::new(MessageLog::new());
        let gateway = HeroGateway::new(InMemoryHeroTransport::with_config(config), log.clone());
        (gateway, log)
    }

    /// Dashboard → detail → edit → back, as a user session would drive it
    #[tokio::test]
    async fn test_edit_session() {
        let (gateway, log) = setup(InMemoryConfig::default());

        let heroes = gateway.get_heroes().await;
        let mut hero = gateway.get_hero(heroes[2].id).await.unwrap();
        hero.name = "Bombasto Prime".into();
        assert!(gateway.update_hero(&hero).await.is_some());

        let reloaded = gateway.get_heroes().await;
        assert_eq!(reloaded[2], hero);
        assert_eq!(
            log.messages(),
            vec![
                "HeroService: fetched heroes",
                "HeroService: fetched hero id=13",
                "HeroService: updated hero id=13",
                "HeroService: fetched heroes",
            ]
        );
    }

    #[tokio::test]
    async fn test_add_then_delete_by_record() {
        let (gateway, log) = setup(InMemoryConfig::default());

        let created = gateway.add_hero(&NewHero::new("Ozzy")).await.unwrap();
        assert_eq!(created, HeroRecord::new(21, "Ozzy"));
        assert!(gateway.delete_hero(&created).await.is_some());
        assert!(!gateway.get_heroes().await.contains(&created));

        assert_eq!(log.matching("id=21").len(), 2);
        assert_eq!(gateway.transport().calls(TransportOp::Delete), 1);
    }

    /// Every operation keeps working while the backend is down
    #[tokio::test]
    async fn test_outage_is_absorbed_everywhere() {
        let config = TransportOp::ALL
            .into_iter()
            .fold(InMemoryConfig::default(), |config, op| config.failing(op, 503));
        let (gateway, log) = setup(config);
        let mut failures = gateway.subscribe_failures();

        assert!(gateway.get_heroes().await.is_empty());
        assert!(gateway.get_hero(11).await.is_none());
        assert!(gateway.add_hero(&NewHero::new("Ozzy")).await.is_none());
        assert!(gateway.update_hero(&HeroRecord::new(11, "x")).await.is_none());
        assert!(gateway.delete_hero(11).await.is_none());
        assert!(gateway.search_heroes("ma").await.is_empty());

        let mut ops = Vec::new();
        while let Ok(failure) = failures.try_recv() {
            assert_eq!(failure.status, Some(503));
            ops.push(failure.op);
        }
        assert_eq!(
            ops,
            vec![
                GatewayOp::GetHeroes,
                GatewayOp::GetHero,
                GatewayOp::AddHero,
                GatewayOp::UpdateHero,
                GatewayOp::DeleteHero,
                GatewayOp::SearchHeroes,
            ]
        );
        assert_eq!(log.matching(" failed: ").len(), 6);
        assert_eq!(gateway.metrics().snapshot().fallbacks, 6);
    }
}

#[cfg(test)]
mod search_e2e {
    use std::sync::Arc;
    use std::time::Duration;

    use contracts::{SearchConfig, SupersedePolicy};
    use gateway::{HeroGateway, MessageLog};
    use search::SearchPipeline;
    use tokio::time::sleep;
    use transport::{InMemoryConfig, InMemoryHeroTransport, TransportOp};

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    fn gateway(config: InMemoryConfig) -> (Arc<HeroGateway<InMemoryHeroTransport>>, Arc<MessageLog>) {
        let log = Arc::new(MessageLog::new());
        let gateway = HeroGateway::new(InMemoryHeroTransport::with_config(config), log.clone());
        (Arc::new(gateway), log)
    }

    /// "b"@0, "ba"@50, "bat"@400 with a 300ms debounce: only "bat" reaches
    /// the consumer.
    #[tokio::test(start_paused = true)]
    async fn test_typing_scenario_delivers_last_term() {
        let (gateway, log) =
            gateway(InMemoryConfig::default().with_search_latency("ba", ms(100)));
        let mut handle = SearchPipeline::spawn(gateway.clone(), SearchConfig::default());

        handle.search("b");
        sleep(ms(50)).await;
        handle.search("ba");
        sleep(ms(350)).await;
        handle.search("bat");

        let results = handle.next().await.unwrap();
        assert_eq!(results.term, "bat");

        let (rest, stats) = handle.finish().await;
        assert!(rest.is_empty());
        assert_eq!(stats.delivered, 1);
        assert_eq!(gateway.transport().search_terms(), vec!["ba", "bat"]);
        // The superseded call still completed and was logged
        assert_eq!(log.matching("matching \"ba\"").len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_older_result_never_observed() {
        let (gateway, _log) =
            gateway(InMemoryConfig::default().with_search_latency("dr", ms(2_000)));
        let config = SearchConfig::default().with_supersede(SupersedePolicy::OnDispatch);
        let mut handle = SearchPipeline::spawn(gateway.clone(), config);

        handle.search("dr");
        sleep(ms(400)).await;
        handle.search("mag");

        let results = handle.next().await.unwrap();
        assert_eq!(results.term, "mag");
        assert_eq!(results.heroes.len(), 2);

        sleep(ms(3_000)).await;
        let (rest, _) = handle.finish().await;
        assert!(rest.is_empty());
        assert_eq!(gateway.transport().calls(TransportOp::ListWhere), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_blank_terms_skip_transport() {
        let (gateway, log) = gateway(InMemoryConfig::default());
        let mut handle = SearchPipeline::spawn(gateway.clone(), SearchConfig::default());

        handle.search("   ");
        let results = handle.next().await.unwrap();

        assert!(results.is_empty());
        assert_eq!(gateway.transport().total_calls(), 0);
        assert!(log.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_search_delivers_empty_set() {
        let (gateway, _log) =
            gateway(InMemoryConfig::default().failing(TransportOp::ListWhere, 500));
        let mut failures = gateway.subscribe_failures();
        let mut handle = SearchPipeline::spawn(gateway.clone(), SearchConfig::default());

        handle.search("mag");
        let results = handle.next().await.unwrap();

        assert!(results.is_empty());
        assert_eq!(failures.try_recv().unwrap().status, Some(500));
    }
}

#[cfg(test)]
mod http_e2e {
    use std::collections::{BTreeMap, HashMap};
    use std::sync::{Arc, Mutex};

    use axum::extract::{Path, Query, State};
    use axum::http::{header, HeaderMap, StatusCode};
    use axum::routing::get;
    use axum::{Json, Router};

    use contracts::{HeroRecord, HeroTransport, NewHero, TransportConfig};
    use gateway::{HeroGateway, MessageLog};
    use transport::HttpHeroTransport;

    /// Fake collection server mirroring the REST endpoint
    #[derive(Clone, Default)]
    struct FakeServer {
        heroes: Arc<Mutex<BTreeMap<i64, HeroRecord>>>,
        requests: Arc<Mutex<Vec<String>>>,
        content_types: Arc<Mutex<Vec<(String, Option<String>)>>>,
        fail_list: Arc<Mutex<bool>>,
    }

    impl FakeServer {
        fn seeded(heroes: impl IntoIterator<Item = HeroRecord>) -> Self {
            let server = Self::default();
            server
                .heroes
                .lock()
                .unwrap()
                .extend(heroes.into_iter().map(|hero| (hero.id, hero)));
            server
        }

        fn record(&self, request: String) {
            self.requests.lock().unwrap().push(request);
        }

        fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }

        fn record_content_type(&self, request: &str, headers: &HeaderMap) {
            let content_type = headers
                .get(header::CONTENT_TYPE)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string);
            self.content_types
                .lock()
                .unwrap()
                .push((request.to_string(), content_type));
        }

        fn content_types(&self) -> Vec<(String, Option<String>)> {
            self.content_types.lock().unwrap().clone()
        }
    }

    async fn list_heroes(
        State(server): State<FakeServer>,
        Query(query): Query<HashMap<String, String>>,
    ) -> Result<Json<Vec<HeroRecord>>, StatusCode> {
        let name = query.get("name").cloned();
        server.record(match &name {
            Some(name) => format!("GET /heroes?name={name}"),
            None => "GET /heroes".to_string(),
        });
        if *server.fail_list.lock().unwrap() {
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
        let needle = name.unwrap_or_default().to_lowercase();
        let heroes = server
            .heroes
            .lock()
            .unwrap()
            .values()
            .filter(|hero| hero.name.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        Ok(Json(heroes))
    }

    async fn get_hero(
        State(server): State<FakeServer>,
        Path(id): Path<i64>,
    ) -> Result<Json<HeroRecord>, StatusCode> {
        server.record(format!("GET /heroes/{id}"));
        let hero = server.heroes.lock().unwrap().get(&id).cloned();
        hero.map(Json).ok_or(StatusCode::NOT_FOUND)
    }

    async fn create_hero(
        State(server): State<FakeServer>,
        headers: HeaderMap,
        Json(hero): Json<NewHero>,
    ) -> Json<HeroRecord> {
        server.record("POST /heroes".to_string());
        server.record_content_type("POST", &headers);
        let mut heroes = server.heroes.lock().unwrap();
        let id = heroes.keys().next_back().map(|max| max + 1).unwrap_or(11);
        let created = HeroRecord::new(id, hero.name);
        heroes.insert(id, created.clone());
        Json(created)
    }

    async fn update_hero(
        State(server): State<FakeServer>,
        headers: HeaderMap,
        Json(hero): Json<HeroRecord>,
    ) -> StatusCode {
        server.record("PUT /heroes".to_string());
        server.record_content_type("PUT", &headers);
        match server.heroes.lock().unwrap().get_mut(&hero.id) {
            Some(stored) => {
                *stored = hero;
                StatusCode::NO_CONTENT
            }
            None => StatusCode::NOT_FOUND,
        }
    }

    async fn delete_hero(
        State(server): State<FakeServer>,
        headers: HeaderMap,
        Path(id): Path<i64>,
    ) -> StatusCode {
        server.record(format!("DELETE /heroes/{id}"));
        server.record_content_type("DELETE", &headers);
        match server.heroes.lock().unwrap().remove(&id) {
            Some(_) => StatusCode::NO_CONTENT,
            None => StatusCode::NOT_FOUND,
        }
    }

    async fn serve(server: FakeServer) -> TransportConfig {
        let app = Router::new()
            .route(
                "/api/heroes",
                get(list_heroes).post(create_hero).put(update_hero),
            )
            .route("/api/heroes/:id", get(get_hero).delete(delete_hero))
            .with_state(server);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        TransportConfig {
            base_url: format!("http://{addr}/api"),
            ..Default::default()
        }
    }

    fn six_heroes() -> Vec<HeroRecord> {
        (1..=6).map(|id| HeroRecord::new(id, format!("Hero {id}"))).collect()
    }

    #[tokio::test]
    async fn test_crud_round_trip() {
        let server = FakeServer::seeded(six_heroes());
        let config = serve(server.clone()).await;
        let log = Arc::new(MessageLog::new());
        let gateway = HeroGateway::new(HttpHeroTransport::new(&config).unwrap(), log.clone());

        assert_eq!(gateway.get_heroes().await.len(), 6);

        let created = gateway.add_hero(&NewHero::new("Ozzy")).await;
        assert_eq!(created, Some(HeroRecord::new(7, "Ozzy")));
        assert!(log.messages().contains(&"HeroService: added hero w/ id=7".to_string()));

        let renamed = HeroRecord::new(7, "Ozzy Prime");
        assert!(gateway.update_hero(&renamed).await.is_some());
        assert_eq!(gateway.get_hero(7).await, Some(renamed.clone()));

        assert!(gateway.delete_hero(7).await.is_some());
        assert!(gateway.get_hero(7).await.is_none());

        assert_eq!(
            server.requests(),
            vec![
                "GET /heroes",
                "POST /heroes",
                "PUT /heroes",
                "GET /heroes/7",
                "DELETE /heroes/7",
                "GET /heroes/7",
            ]
        );
    }

    #[tokio::test]
    async fn test_writes_carry_json_content_type() {
        let server = FakeServer::seeded(six_heroes());
        let config = serve(server.clone()).await;
        let gateway = HeroGateway::new(
            HttpHeroTransport::new(&config).unwrap(),
            Arc::new(MessageLog::new()),
        );

        gateway.add_hero(&NewHero::new("Ozzy")).await.unwrap();
        gateway.update_hero(&HeroRecord::new(7, "Ozzy Prime")).await.unwrap();
        gateway.delete_hero(7).await.unwrap();

        let json = Some("application/json".to_string());
        assert_eq!(
            server.content_types(),
            vec![
                ("POST".to_string(), json.clone()),
                ("PUT".to_string(), json.clone()),
                ("DELETE".to_string(), json),
            ]
        );
    }

    #[tokio::test]
    async fn test_delete_by_id_and_by_record_hit_same_path() {
        let server = FakeServer::seeded(vec![HeroRecord::new(7, "Ozzy"), HeroRecord::new(8, "Ozzy")]);
        let config = serve(server.clone()).await;
        let transport = HttpHeroTransport::new(&config).unwrap();
        let gateway = HeroGateway::new(transport, Arc::new(MessageLog::new()));

        gateway.delete_hero(7).await;
        gateway.add_hero(&NewHero::new("Ozzy")).await;
        let record = HeroRecord::new(7, "whatever the name");
        // Re-created hero takes id 9, so delete by record of id 7 now 404s
        assert!(gateway.delete_hero(&record).await.is_none());

        let deletes: Vec<_> = server
            .requests()
            .into_iter()
            .filter(|request| request.starts_with("DELETE"))
            .collect();
        assert_eq!(deletes, vec!["DELETE /heroes/7", "DELETE /heroes/7"]);
    }

    #[tokio::test]
    async fn test_server_error_falls_back() {
        let server = FakeServer::seeded(six_heroes());
        *server.fail_list.lock().unwrap() = true;
        let config = serve(server.clone()).await;
        let log = Arc::new(MessageLog::new());
        let gateway = HeroGateway::new(HttpHeroTransport::new(&config).unwrap(), log.clone());
        let mut failures = gateway.subscribe_failures();

        assert!(gateway.get_heroes().await.is_empty());

        let messages = log.messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].starts_with("HeroService: get_heroes failed: "));
        assert_eq!(failures.try_recv().unwrap().status, Some(500));
    }

    #[tokio::test]
    async fn test_search_query_is_encoded() {
        let server = FakeServer::seeded(vec![HeroRecord::new(1, "Dr Nice"), HeroRecord::new(2, "Dr IQ")]);
        let config = serve(server.clone()).await;
        let transport = HttpHeroTransport::new(&config).unwrap();

        let found = transport.list_where("dr n").await.unwrap();

        assert_eq!(found, vec![HeroRecord::new(1, "Dr Nice")]);
        assert_eq!(server.requests(), vec!["GET /heroes?name=dr n"]);
    }
}
