use {
    crate::config::RunOptions,
    anyhow::{
        anyhow,
        Result,
    },
    futures::future::join_all,
    rand::Rng,
    room_server::{
        api::{
            loopback::loopback_channel,
            subscriber::{
                MessageStream,
                Subscriber,
            },
            RoomError,
        },
        config::Config,
        kernel::{
            entities::{
                Amount,
                ProductId,
            },
            store::{
                LoggingRecorder,
                StaticCatalog,
            },
        },
        room::{
            entities::RoomEvent,
            service::{
                attach::AttachInput,
                detach::DetachInput,
                submit_bid::SubmitBidInput,
                Service,
            },
        },
    },
    room_server_api_types::ws::ServerUpdateResponse,
    std::{
        sync::Arc,
        time::Duration,
    },
    time::OffsetDateTime,
};

pub async fn run_simulator(opts: RunOptions) -> Result<()> {
    let config = Config::load(&opts.config)
        .map_err(|err| anyhow!("Failed to load config from file({}): {:?}", opts.config, err))?;
    if config.products.is_empty() {
        return Err(anyhow!("The catalog has no products to auction"));
    }

    let catalog = Arc::new(StaticCatalog::new());
    let now = OffsetDateTime::now_utc();
    for (product_id, product) in &config.products {
        catalog.insert(product_id.clone(), product.seed(now)).await;
    }
    let service = Service::new(catalog, Arc::new(LoggingRecorder), config.rooms.clone());

    let mut tasks = Vec::new();
    for (product_id, product) in &config.products {
        tasks.push(tokio::spawn(run_auditor(
            service.clone(),
            product_id.clone(),
        )));
        for n in 0..opts.bidders {
            tasks.push(tokio::spawn(run_bidder(
                service.clone(),
                product_id.clone(),
                format!("bidder-{n}"),
                product.base_price,
                opts.clone(),
            )));
        }
    }

    for outcome in join_all(tasks).await {
        if let Err(err) = outcome? {
            tracing::error!(error = ?err, "Simulation participant failed");
        }
    }

    service.shutdown().await;
    Ok(())
}

/// Watches one room through the full api boundary (frames over a loopback
/// channel) and reports what every real client would have seen.
async fn run_auditor(service: Service, product_id: ProductId) -> Result<()> {
    let (server_sink, mut frames) = loopback_channel(256);
    // The auditor never sends frames, but the inbound half has to stay open
    // for the session to survive.
    let (client_sink, client_stream) = loopback_channel(1);

    let mut subscriber = Subscriber::connect(
        service,
        product_id.clone(),
        "auditor".to_string(),
        server_sink,
        client_stream,
    )
    .await
    .map_err(|err| anyhow!("Auditor failed to attach to {product_id}: {err}"))?;
    let session = tokio::spawn(async move { subscriber.run().await });

    let mut accepted = 0u64;
    while let Some(frame) = frames.next().await {
        match serde_json::from_str::<ServerUpdateResponse>(&frame)? {
            ServerUpdateResponse::BidAccepted { .. } => accepted += 1,
            ServerUpdateResponse::AuctionClosed { winning_bid } => {
                tracing::info!(
                    product_id = %product_id,
                    accepted,
                    winner = winning_bid.as_ref().map(|bid| bid.bidder.as_str()),
                    final_amount = winning_bid.as_ref().map(|bid| bid.amount),
                    "Auction finished"
                );
                break;
            }
            ServerUpdateResponse::Snapshot { .. } | ServerUpdateResponse::AuctionOpened => {}
        }
    }

    drop(client_sink);
    session.await?;
    Ok(())
}

async fn run_bidder(
    service: Service,
    product_id: ProductId,
    bidder: String,
    base_price: Amount,
    opts: RunOptions,
) -> Result<()> {
    let (mut connection, snapshot) = service
        .attach(AttachInput {
            product_id: product_id.clone(),
            bidder:     bidder.clone(),
        })
        .await
        .map_err(|err| anyhow!("{bidder} failed to attach to {product_id}: {err}"))?;
    let mut highest = snapshot.highest_bid.map(|bid| bid.amount);
    let mut won = 0u64;

    loop {
        let pause = {
            let mut rng = rand::thread_rng();
            Duration::from_millis(rng.gen_range(opts.bid_interval_ms / 2..=opts.bid_interval_ms * 2))
        };
        tokio::select! {
            maybe_event = connection.next_event() => match maybe_event {
                Some(RoomEvent::BidAccepted { bid, .. }) => highest = Some(bid.amount),
                Some(RoomEvent::AuctionClosed { winning_bid }) => {
                    if winning_bid.is_some_and(|bid| bid.bidder == bidder) {
                        won += 1;
                    }
                    break;
                }
                Some(RoomEvent::AuctionOpened) => {}
                None => break,
            },
            () = tokio::time::sleep(pause) => {
                let raise = {
                    let mut rng = rand::thread_rng();
                    rng.gen_range(1..=opts.max_raise)
                };
                let amount = match highest {
                    Some(current) => current + raise,
                    None => base_price,
                };
                let submitted = service
                    .submit_bid(SubmitBidInput {
                        product_id: product_id.clone(),
                        bidder:     bidder.clone(),
                        amount,
                        origin:     Some(connection.subscriber),
                    })
                    .await;
                match submitted {
                    Ok(bid) => highest = Some(bid.amount),
                    Err(RoomError::AmountTooLow { current }) => highest = Some(current),
                    // Pending rooms open on their own; closed rooms finish
                    // through the event stream.
                    Err(RoomError::AuctionNotOpen) => {}
                    Err(err) => {
                        tracing::debug!(bidder = %bidder, error = %err, "Submission failed");
                    }
                }
            },
        }
    }

    service
        .detach(DetachInput {
            product_id: product_id.clone(),
            subscriber: connection.subscriber,
        })
        .await;
    if won > 0 {
        tracing::info!(bidder = %bidder, product_id = %product_id, "Bidder won the auction");
    }
    Ok(())
}
