use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::domain::models::{TweetId, TweetWithAuthor};
use crate::inbounds::api_error::ApiResult;
use crate::inbounds::auth::AuthUser;
use crate::inbounds::dtos::{CreateTweetRequest, QuoteTweetRequest};
use crate::inbounds::AppState;

/// +----------------------------------------------------------+
/// | STRUCTS | TRAITS | ENUMS | FUNCTIONS                     |
/// +----------+-------+-------+------------------------------+
/// | Functions:                                               |
/// |   - create_tweet                                         |
/// |   - quote_tweet                                          |
/// |   - like_tweet                                           |
/// |   - unlike_tweet                                         |
/// |   - retweet                                              |
/// |   - unretweet                                            |
/// +----------------------------------------------------------+

/// `POST /api/tweets`
pub async fn create_tweet(
    AuthUser(user_id): AuthUser,
    Extension(state): Extension<Arc<AppState>>,
    Json(req): Json<CreateTweetRequest>,
) -> ApiResult<Response> {
    let tweet = state
        .activity
        .create_tweet(&user_id, &req.content, req.reply_to)
        .await?;
    Ok((StatusCode::CREATED, Json(tweet)).into_response())
}

/// `POST /api/tweets/:id/quote`
pub async fn quote_tweet(
    AuthUser(user_id): AuthUser,
    Path(tweet_id): Path<String>,
    Extension(state): Extension<Arc<AppState>>,
    Json(req): Json<QuoteTweetRequest>,
) -> ApiResult<Response> {
    let quote = state
        .activity
        .quote_tweet(&user_id, &TweetId::new(tweet_id), &req.content)
        .await?;
    Ok((StatusCode::CREATED, Json(quote)).into_response())
}

/// `POST /api/tweets/:id/like`
pub async fn like_tweet(
    AuthUser(user_id): AuthUser,
    Path(tweet_id): Path<String>,
    Extension(state): Extension<Arc<AppState>>,
) -> ApiResult<Response> {
    let tweet = state
        .activity
        .like_tweet(&user_id, &TweetId::new(tweet_id))
        .await?;
    Ok((StatusCode::OK, Json(tweet)).into_response())
}

/// `POST /api/tweets/:id/retweet`
pub async fn retweet(
    AuthUser(user_id): AuthUser,
    Path(tweet_id): Path<String>,
    Extension(state): Extension<Arc<AppState>>,
) -> ApiResult<Response> {
    let tweet = state
        .activity
        .retweet(&user_id, &TweetId::new(tweet_id))
        .await?;
    Ok((StatusCode::OK, Json(tweet)).into_response())
}

/// `POST /api/tweets/:id/unlike`
pub async fn unlike_tweet(
    AuthUser(user_id): AuthUser,
    Path(tweet_id): Path<String>,
    Extension(state): Extension<Arc<AppState>>,
) -> ApiResult<Json<TweetWithAuthor>> {
    let tweet = state
        .activity
        .unlike_tweet(&user_id, &TweetId::new(tweet_id))
        .await?;
    Ok(Json(tweet))
}

/// `POST /api/tweets/:id/unretweet`
pub async fn unretweet(
    AuthUser(user_id): AuthUser,
    Path(tweet_id): Path<String>,
    Extension(state): Extension<Arc<AppState>>,
) -> ApiResult<Json<TweetWithAuthor>> {
    let tweet = state
        .activity
        .unretweet(&user_id, &TweetId::new(tweet_id))
        .await?;
    Ok(Json(tweet))
}
