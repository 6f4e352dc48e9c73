use axum::{
    extract::Path,
    routing::{delete, get, patch, post},
};

use crate::{
    auth::Session,
    context::ServerContext,
    errors::{parse_id, ServerResult},
    schemas::{TweetSchema, ValidatedJson},
    serialized::{Envelope, ToSerialized, Tweet},
    Router,
};

#[utoipa::path(
    post,
    path = "/api/v1/tweets",
    tag = "tweets",
    request_body = TweetSchema,
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 201, body = Tweet)
    )
)]
async fn create_tweet(
    session: Session,
    context: ServerContext,
    ValidatedJson(body): ValidatedJson<TweetSchema>,
) -> ServerResult<Envelope<Tweet>> {
    let tweet = context.app.tweets.create(&session.user, body.content).await?;

    Ok(Envelope::created(tweet.to_serialized(), "Tweet created"))
}

#[utoipa::path(
    get,
    path = "/api/v1/tweets/user/{userId}",
    tag = "tweets",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = Vec<Tweet>)
    )
)]
async fn tweets_by_user(
    _session: Session,
    context: ServerContext,
    Path(user_id): Path<String>,
) -> ServerResult<Envelope<Vec<Tweet>>> {
    let user_id = parse_id(&user_id, "userId")?;
    let tweets = context.app.tweets.by_owner(user_id).await?;

    Ok(Envelope::ok(tweets.to_serialized(), "Tweets fetched"))
}

#[utoipa::path(
    patch,
    path = "/api/v1/tweets/{tweetId}",
    tag = "tweets",
    request_body = TweetSchema,
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = Tweet)
    )
)]
async fn update_tweet(
    session: Session,
    context: ServerContext,
    Path(tweet_id): Path<String>,
    ValidatedJson(body): ValidatedJson<TweetSchema>,
) -> ServerResult<Envelope<Tweet>> {
    let tweet_id = parse_id(&tweet_id, "tweetId")?;

    let tweet = context
        .app
        .tweets
        .update(&session.user, tweet_id, body.content)
        .await?;

    Ok(Envelope::ok(tweet.to_serialized(), "Tweet updated"))
}

#[utoipa::path(
    delete,
    path = "/api/v1/tweets/{tweetId}",
    tag = "tweets",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200)
    )
)]
async fn delete_tweet(
    session: Session,
    context: ServerContext,
    Path(tweet_id): Path<String>,
) -> ServerResult<Envelope<()>> {
    let tweet_id = parse_id(&tweet_id, "tweetId")?;
    context.app.tweets.delete(&session.user, tweet_id).await?;

    Ok(Envelope::ok((), "Tweet deleted"))
}

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_tweet))
        .route("/user/:userId", get(tweets_by_user))
        .route("/:tweetId", patch(update_tweet))
        .route("/:tweetId", delete(delete_tweet))
}
