//! Fixed GraphQL documents, one per tool operation. Page sizes are baked
//! in; there is no pagination beyond them.

pub const MY_ISSUES: &str = r#"
query {
    viewer {
        assignedIssues(first: 50) {
            nodes {
                id
                identifier
                title
                description
                state { name }
                priority
                project { name }
            }
        }
    }
}
"#;

pub const ISSUE: &str = r#"
query($identifier: String!) {
    issue(id: $identifier) {
        id
        identifier
        title
        description
        state { id name }
        priority
        labels { nodes { name } }
        assignee { name email }
        project { name }
        team { id name }
        comments { nodes { body user { name } createdAt } }
    }
}
"#;

pub const SEARCH_ISSUES: &str = r#"
query($query: String!) {
    issues(filter: {
        or: [
            { title: { containsIgnoreCase: $query } },
            { description: { containsIgnoreCase: $query } }
        ]
    }, first: 50) {
        nodes {
            id
            identifier
            title
            description
            state { name }
            priority
            project { name }
        }
    }
}
"#;

pub const PROJECTS: &str = r#"
query {
    projects(first: 50) {
        nodes {
            id
            name
            description
            state
            url
        }
    }
}
"#;

pub const TEAM_PROJECTS: &str = r#"
query($teamId: String!) {
    team(id: $teamId) {
        projects(first: 50) {
            nodes {
                id
                name
                description
                state
                url
            }
        }
    }
}
"#;

pub const PROJECT_UPDATES: &str = r#"
query($projectId: String!, $limit: Int!) {
    project(id: $projectId) {
        id
        name
        projectUpdates(first: $limit) {
            nodes {
                id
                body
                health
                createdAt
                user { name email }
            }
        }
    }
}
"#;

pub const TEAM_STATES: &str = r#"
query($teamId: String!) {
    team(id: $teamId) {
        id
        name
        states {
            nodes {
                id
                name
                type
            }
        }
    }
}
"#;

pub const ALL_TEAMS_STATES: &str = r#"
query {
    teams {
        nodes {
            id
            name
            states {
                nodes {
                    id
                    name
                    type
                }
            }
        }
    }
}
"#;

pub const CREATE_ISSUE: &str = r#"
mutation($teamId: String!, $title: String!, $description: String, $priority: Int, $stateId: String, $assigneeId: String, $projectId: String) {
    issueCreate(input: {
        teamId: $teamId
        title: $title
        description: $description
        priority: $priority
        stateId: $stateId
        assigneeId: $assigneeId
        projectId: $projectId
    }) {
        success
        issue {
            id
            identifier
            title
            url
            state { name }
            assignee { name }
            project { id name }
        }
    }
}
"#;

pub const UPDATE_ISSUE: &str = r#"
mutation($id: String!, $title: String, $description: String, $priority: Int, $stateId: String, $assigneeId: String) {
    issueUpdate(id: $id, input: {
        title: $title
        description: $description
        priority: $priority
        stateId: $stateId
        assigneeId: $assigneeId
    }) {
        success
        issue {
            id
            identifier
            title
            url
            state { name }
            assignee { name }
        }
    }
}
"#;

pub const UPDATE_STATUS: &str = r#"
mutation($id: String!, $stateId: String!) {
    issueUpdate(id: $id, input: { stateId: $stateId }) {
        success
        issue {
            id
            identifier
            state { name }
        }
    }
}
"#;

pub const CREATE_PROJECT: &str = r#"
mutation($name: String!, $teamIds: [String!]!, $description: String, $state: String) {
    projectCreate(input: {
        name: $name
        teamIds: $teamIds
        description: $description
        state: $state
    }) {
        success
        project {
            id
            name
            slugId
            url
        }
    }
}
"#;

pub const CREATE_PROJECT_UPDATE: &str = r#"
mutation($projectId: String!, $body: String!, $health: ProjectUpdateHealthType) {
    projectUpdateCreate(input: {
        projectId: $projectId
        body: $body
        health: $health
    }) {
        success
        projectUpdate {
            id
            body
            health
            createdAt
            user { name email }
            project { id name }
        }
    }
}
"#;
