// Tab list, menu and kitchen board feeds against an in-memory backend

use std::time::Duration;

use comanda_client::{MessageClient, RefreshOutcome, TabList};
use comanda_core::KitchenBoard;
use serde_json::{Value, json};
use shared::message::BusMessage;
use shared::models::Category;
use shared::order::{OrderCommand, TabEvent};
use tokio::sync::broadcast;

fn event(value: Value) -> TabEvent {
    serde_json::from_value(value).unwrap()
}

fn tab_list() -> TabEvent {
    event(json!({
        "event": "respostaComandas",
        "data": {
            "dados_comandaAberta": [{"comanda": "12"}, {"comanda": 120}, {"comanda": "7"}],
            "dados_comandaFechada": [{"comanda": "12", "ordem": 1}, {"comanda": "31", "ordem": 2}]
        }
    }))
}

fn channels() -> (
    broadcast::Sender<BusMessage>,
    broadcast::Sender<BusMessage>,
    MessageClient,
) {
    let (push, _) = broadcast::channel(64);
    let (to_server, _) = broadcast::channel(64);
    let client = MessageClient::memory(&push, &to_server);
    (push, to_server, client)
}

fn publish(push: &broadcast::Sender<BusMessage>, event: &TabEvent) {
    push.send(BusMessage::tab_event(event).unwrap()).unwrap();
}

/// Answer the next tab list request, after some unrelated traffic
fn answer_tab_list(to_server: &broadcast::Sender<BusMessage>, push: broadcast::Sender<BusMessage>) {
    let mut inbox = to_server.subscribe();
    tokio::spawn(async move {
        while let Ok(msg) = inbox.recv().await {
            let Ok(OrderCommand::ListTabs(_)) = msg.parse_payload() else {
                continue;
            };
            publish(&push, &event(json!({"event": "comanda_deleted", "data": {"fcomanda": 4}})));
            publish(&push, &tab_list());
            break;
        }
    });
}

#[tokio::test]
async fn test_tab_list_refresh_and_search() {
    let (push, to_server, client) = channels();
    let mut list = TabList::open(&client);
    answer_tab_list(&to_server, push.clone());

    assert_eq!(list.refresh().await.unwrap(), RefreshOutcome::Updated);
    let directory = list.directory();
    assert!(!directory.is_refreshing(std::time::Instant::now()));
    assert_eq!(directory.open().len(), 3);
    assert_eq!(directory.closed().len(), 2);

    list.directory_mut().set_query("12");
    let open: Vec<&str> = list
        .directory()
        .open()
        .iter()
        .map(|e| e.comanda.as_str())
        .collect();
    assert_eq!(open, vec!["12", "120"]);
    assert_eq!(list.directory().closed()[0].ordem, 1);
}

#[tokio::test]
async fn test_tab_list_refresh_times_out() {
    let (push, to_server, client) = channels();
    // Backend that reads requests but never answers
    let _inbox = to_server.subscribe();
    let mut list = TabList::open(&client).with_timeout(Duration::from_millis(50));
    publish(&push, &tab_list());
    assert!(list.next_listing().await);

    let outcome = list.refresh().await.unwrap();
    assert_eq!(outcome, RefreshOutcome::TimedOut);
    assert!(!list.directory().is_refreshing(std::time::Instant::now()));
    assert_eq!(list.directory().open().len(), 3);

    drop(push);
    assert!(!list.next_listing().await);
}

#[tokio::test]
async fn test_menu_feed_normalizes_options() {
    let (push, _to_server, client) = channels();
    let mut menu = client.subscribe_menu();

    publish(&push, &tab_list());
    publish(
        &push,
        &event(json!({
            "event": "respostaCardapio",
            "data": {"dataCardapio": [
                {"id": 3, "item": "Caipirinha", "preco": 18, "categoria_id": 2,
                 "opcoes": "Fruta(limao-morango+2)"},
                {"id": 4, "item": "Fritas", "preco": "32,5", "categoria_id": 3}
            ]}
        })),
    );

    let items = tokio::time::timeout(Duration::from_secs(1), menu.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].name, "Caipirinha");
    assert_eq!(items[0].category, Category::Bebida);
    assert_eq!(items[0].option_groups[0].name, "Fruta");
    assert_eq!(items[0].option_groups[0].options[1].extra_price, 2.0);
    assert_eq!(items[1].category, Category::Porcao);
}

#[tokio::test]
async fn test_board_feed_keeps_station_lines() {
    let (push, _to_server, client) = channels();
    let mut kitchen = client.subscribe_board(KitchenBoard::kitchen());
    let mut bar = client.subscribe_board(KitchenBoard::bar());

    let orders = event(json!({
        "event": "respostaPedidos",
        "data": {"dataPedidos": [
            {"id": 1, "pedido": "Fritas", "quantidade": 2, "categoria": "3"},
            {"id": 2, "pedido": "Caipirinha", "quantidade": 1, "categoria": 2},
            {"id": 3, "pedido": "Calabresa", "quantidade": 1, "categoria": 3, "estado": "Pronto"}
        ]}
    }));
    publish(&push, &orders);

    let board = kitchen.recv().await.unwrap();
    assert_eq!(board.station(), Category::Porcao);
    assert_eq!(board.lines().len(), 2);
    assert_eq!(board.visible(true).len(), 1);
    assert_eq!(board.advance("1").unwrap().estado, "Em Preparo");

    assert_eq!(bar.recv().await.unwrap().lines()[0].name, "Caipirinha");

    // The next list replaces the board's lines
    publish(
        &push,
        &event(json!({"event": "respostaPedidos", "data": {"dataPedidos": []}})),
    );
    assert!(kitchen.recv().await.unwrap().lines().is_empty());
}
