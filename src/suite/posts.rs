use futures::FutureExt;
use futures::future::LocalBoxFuture;

use crate::asserter::CaseError;
use crate::asserter::Checks;
use crate::client::ApiClient;
use crate::client::Payload;
use crate::post::Post;
use crate::post::PostField;
use crate::suite::TestCase;
use crate::suite::fixtures;

const POSTS: &str = "/posts";
const POST_ID: i64 = 1;
const MISSING_POST_ID: i64 = 99999;

type CaseFuture<'a> = LocalBoxFuture<'a, Result<(), CaseError>>;

fn post_path(id: i64) -> String {
    format!("{POSTS}/{id}")
}

pub fn cases() -> Vec<TestCase> {
    vec![
        TestCase {
            name: "get_all_posts",
            description: "Fetch the whole posts collection",
            endpoint: "GET /posts",
            checks: "Status code 200, non-empty list, required fields on every post",
            run: get_all_posts,
        },
        TestCase {
            name: "get_single_post",
            description: "Fetch one post by id",
            endpoint: "GET /posts/1",
            checks: "Status code 200, required fields, id and field types",
            run: get_single_post,
        },
        TestCase {
            name: "create_post",
            description: "Create a new post",
            endpoint: "POST /posts",
            checks: "Status code 201, id generated, sent fields echoed",
            run: create_post,
        },
        TestCase {
            name: "update_post",
            description: "Replace a post",
            endpoint: "PUT /posts/1",
            checks: "Status code 200, new values reflected",
            run: update_post,
        },
        TestCase {
            name: "delete_post",
            description: "Delete a post",
            endpoint: "DELETE /posts/1",
            checks: "Status code 200",
            run: delete_post,
        },
        TestCase {
            name: "nonexistent_resource",
            description: "Fetch a post that does not exist",
            endpoint: "GET /posts/99999",
            checks: "Status code 404",
            run: nonexistent_resource,
        },
        TestCase {
            name: "invalid_post_creation",
            description: "Create a post with an empty title and no userId",
            endpoint: "POST /posts",
            checks: "Status code one of 200, 201, 400",
            run: invalid_post_creation,
        },
        TestCase {
            name: "partial_update_post",
            description: "Patch every writable field of a post",
            endpoint: "PATCH /posts/1",
            checks: "Status code 200, sent fields updated, id unchanged",
            run: partial_update_post,
        },
        TestCase {
            name: "partial_update_with_multiple_fields",
            description: "Patch title and body of a post",
            endpoint: "PATCH /posts/1",
            checks: "Status code 200, sent fields updated, userId and id unchanged",
            run: partial_update_with_multiple_fields,
        },
        TestCase {
            name: "partial_update_single_field",
            description: "Patch only the title of a post",
            endpoint: "PATCH /posts/1",
            checks: "Status code 200, title updated, other fields unchanged",
            run: partial_update_single_field,
        },
        TestCase {
            name: "partial_update_empty_data",
            description: "Patch a post with an empty payload",
            endpoint: "PATCH /posts/1",
            checks: "Status code 200, every field unchanged",
            run: partial_update_empty_data,
        },
        TestCase {
            name: "partial_update_nonexistent_post",
            description: "Patch a post that does not exist",
            endpoint: "PATCH /posts/99999",
            checks: "Status code 200, sent fields echoed",
            run: partial_update_nonexistent_post,
        },
        TestCase {
            name: "filter_posts_by_user_id",
            description: "Filter the collection by userId",
            endpoint: "GET /posts?userId=1",
            checks: "Status code 200, every post belongs to userId 1",
            run: filter_posts_by_user_id,
        },
    ]
}

/// Fetches the current state of a post to compare a mutation against.
async fn fetch_baseline(
    client: &ApiClient,
    checks: &mut Checks,
    path: &str,
) -> Result<Post, CaseError> {
    let response = client.get(path, None).await?;
    checks.status(&response, 200)?;
    checks.decode(&response, "the baseline post")
}

async fn patch_against_baseline(
    client: &ApiClient,
    checks: &mut Checks,
    payload: Payload,
) -> Result<(), CaseError> {
    let path = post_path(POST_ID);
    let baseline = fetch_baseline(client, checks, &path).await?;

    let response = client.patch(&path, Some(&payload)).await?;
    checks.status(&response, 200)?;

    let updated: Post = checks.decode(&response, "a post")?;
    checks.partial_update(&payload, &baseline, &updated)
}

fn get_all_posts<'a>(client: &'a ApiClient, checks: &'a mut Checks) -> CaseFuture<'a> {
    async move {
        let response = client.get(POSTS, None).await?;
        checks.status(&response, 200)?;

        let posts: Vec<Post> = checks.decode(&response, "a list of posts")?;
        checks.non_empty("post", &posts)?;
        checks.every_has_fields(&posts, &PostField::ALL)
    }
    .boxed_local()
}

fn get_single_post<'a>(client: &'a ApiClient, checks: &'a mut Checks) -> CaseFuture<'a> {
    async move {
        let response = client.get(&post_path(POST_ID), None).await?;
        checks.status(&response, 200)?;

        // title and body are decoded as strings, so a present field is textual
        let post: Post = checks.decode(&response, "a post")?;
        checks.has_fields(&post, &PostField::ALL)?;
        checks.field_eq(&post, PostField::Id.name(), POST_ID)
    }
    .boxed_local()
}

fn create_post<'a>(client: &'a ApiClient, checks: &'a mut Checks) -> CaseFuture<'a> {
    async move {
        let payload = fixtures::sample_post();

        let response = client.post(POSTS, Some(&payload)).await?;
        checks.status(&response, 201)?;

        let created: Post = checks.decode(&response, "a post")?;
        checks.has_fields(&created, &[PostField::Id])?;
        checks.echoes(&payload, &created)
    }
    .boxed_local()
}

fn update_post<'a>(client: &'a ApiClient, checks: &'a mut Checks) -> CaseFuture<'a> {
    async move {
        let payload = fixtures::update_post();

        let response = client.put(&post_path(POST_ID), Some(&payload)).await?;
        checks.status(&response, 200)?;

        let updated: Post = checks.decode(&response, "a post")?;
        checks.echoes(&payload, &updated)
    }
    .boxed_local()
}

fn delete_post<'a>(client: &'a ApiClient, checks: &'a mut Checks) -> CaseFuture<'a> {
    async move {
        let response = client.delete(&post_path(POST_ID)).await?;
        checks.status(&response, 200)
    }
    .boxed_local()
}

fn nonexistent_resource<'a>(client: &'a ApiClient, checks: &'a mut Checks) -> CaseFuture<'a> {
    async move {
        let response = client.get(&post_path(MISSING_POST_ID), None).await?;
        checks.status(&response, 404)
    }
    .boxed_local()
}

fn invalid_post_creation<'a>(client: &'a ApiClient, checks: &'a mut Checks) -> CaseFuture<'a> {
    async move {
        let payload = fixtures::invalid_post();

        let response = client.post(POSTS, Some(&payload)).await?;
        checks.status_in(&response, &[200, 201, 400])
    }
    .boxed_local()
}

fn partial_update_post<'a>(client: &'a ApiClient, checks: &'a mut Checks) -> CaseFuture<'a> {
    patch_against_baseline(client, checks, fixtures::patch_all()).boxed_local()
}

fn partial_update_with_multiple_fields<'a>(
    client: &'a ApiClient,
    checks: &'a mut Checks,
) -> CaseFuture<'a> {
    patch_against_baseline(client, checks, fixtures::patch_multiple_fields()).boxed_local()
}

fn partial_update_single_field<'a>(
    client: &'a ApiClient,
    checks: &'a mut Checks,
) -> CaseFuture<'a> {
    patch_against_baseline(client, checks, fixtures::patch_single_field()).boxed_local()
}

fn partial_update_empty_data<'a>(client: &'a ApiClient, checks: &'a mut Checks) -> CaseFuture<'a> {
    patch_against_baseline(client, checks, fixtures::patch_empty()).boxed_local()
}

/// The public service answers 200 here rather than 404. Other backends may
/// not, so this case documents that service rather than HTTP in general.
fn partial_update_nonexistent_post<'a>(
    client: &'a ApiClient,
    checks: &'a mut Checks,
) -> CaseFuture<'a> {
    async move {
        let payload = fixtures::patch_all();

        let response = client
            .patch(&post_path(MISSING_POST_ID), Some(&payload))
            .await?;
        checks.status(&response, 200)?;

        let echoed: Post = checks.decode(&response, "a post")?;
        checks.has_fields(&echoed, &[PostField::Title])?;
        checks.echoes(&payload, &echoed)
    }
    .boxed_local()
}

fn filter_posts_by_user_id<'a>(client: &'a ApiClient, checks: &'a mut Checks) -> CaseFuture<'a> {
    async move {
        let response = client.get(POSTS, Some(&[("userId", "1")])).await?;
        checks.status(&response, 200)?;

        let posts: Vec<Post> = checks.decode(&response, "a list of posts")?;
        checks.every(&posts, PostField::UserId.name(), 1)
    }
    .boxed_local()
}
