use graphql_client::{GraphQLQuery, QueryBody};
use serde::{Deserialize, Serialize};

pub const CLOSING_REFERENCES_QUERY: &str = r#"
query GetClosingReferences($owner: String!, $repo: String!, $issue: Int!) {
  repository(owner: $owner, name: $repo) {
    issue(number: $issue) {
      closedByPullRequestsReferences(includeClosedPrs: true, first: 10) {
        nodes {
          permalink
          mergeCommit { oid }
        }
      }
    }
  }
}"#;

#[derive(Debug, Serialize)]
pub struct ClosingReferencesVars {
    pub owner: String,
    pub repo: String,
    pub issue: i64,
}

#[derive(Debug, Deserialize)]
pub struct MergeCommitNode {
    pub oid: String,
}

#[derive(Debug, Deserialize)]
pub struct ClosingPullRequestNode {
    pub permalink: String,
    #[serde(rename = "mergeCommit")]
    pub merge_commit: Option<MergeCommitNode>,
}

#[derive(Debug, Deserialize)]
pub struct ClosingReferencesConnection {
    pub nodes: Vec<ClosingPullRequestNode>,
}

#[derive(Debug, Deserialize)]
pub struct ClosingReferencesIssue {
    #[serde(rename = "closedByPullRequestsReferences")]
    pub closed_by: ClosingReferencesConnection,
}

#[derive(Debug, Deserialize)]
pub struct ClosingReferencesRepository {
    pub issue: Option<ClosingReferencesIssue>,
}

#[derive(Debug, Deserialize)]
pub struct ClosingReferencesData {
    pub repository: ClosingReferencesRepository,
}

pub struct ClosingReferencesQuery {}

impl GraphQLQuery for ClosingReferencesQuery {
    type ResponseData = ClosingReferencesData;
    type Variables = ClosingReferencesVars;

    fn build_query(variables: Self::Variables) -> QueryBody<Self::Variables> {
        QueryBody {
            variables,
            query: CLOSING_REFERENCES_QUERY,
            operation_name: "GetClosingReferences",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_closing_references_response() {
        let json = r#"{
            "data": {
                "repository": {
                    "issue": {
                        "closedByPullRequestsReferences": {
                            "nodes": [
                                {
                                    "permalink": "https://github.com/o/r/pull/1",
                                    "mergeCommit": null
                                },
                                {
                                    "permalink": "https://github.com/o/r/pull/2",
                                    "mergeCommit": { "oid": "abc" }
                                }
                            ]
                        }
                    }
                }
            }
        }"#;

        let response: graphql_client::Response<ClosingReferencesData> =
            serde_json::from_str(json).unwrap();

        let nodes = response
            .data
            .unwrap()
            .repository
            .issue
            .unwrap()
            .closed_by
            .nodes;

        assert_eq!(nodes.len(), 2);
        assert!(nodes[0].merge_commit.is_none());
        assert_eq!(nodes[1].merge_commit.as_ref().unwrap().oid, "abc");
    }

    #[test]
    fn builds_query_body_with_variables() {
        let body = ClosingReferencesQuery::build_query(ClosingReferencesVars {
            owner: "o".into(),
            repo: "r".into(),
            issue: 100,
        });

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["variables"]["issue"], 100);
        assert_eq!(json["operationName"], "GetClosingReferences");
    }
}
